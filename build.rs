use std::env;

// Exposes the build target to `sevlog --version`.
fn main() {
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=SEVLOG_BUILD_TARGET={}", target);
    println!("cargo:rerun-if-changed=build.rs");
}
