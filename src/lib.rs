//! Leveled logging to a single shared stream.
//!
//! Every record is one line of four tab separated fields:
//!
//! ```text
//! 2024-01-02T15:04:05.123Z	WARN	src/fetch.rs:42	x=5
//! ```
//!
//! Records below the configured minimum [`Severity`] are dropped. FATAL records exit the
//! process and PANIC records unwind with a [`LogPanic`] once the line is written.
//!
//! ```
//! use sevlog::{Logger, Output, Severity};
//!
//! let logger = Logger::builder()
//!     .minimum_level(Severity::Warn)
//!     .output(Output::Stdout)
//!     .build();
//! logger.info("ignored", &[]);
//! logger.warn("x=%d", &[5.into()]);
//! ```
#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod location;
pub mod logger;
mod macros;
pub mod output;
pub mod record;
pub mod severity;
pub mod template;


pub use config::{initialization, ConfigError, LoggerFlags, CONFIG_EXIT_CODE};
pub use location::CallSite;
pub use logger::{LogPanic, Logger, LoggerBuilder, FATAL_EXIT_CODE};
pub use output::Output;
pub use severity::{MinimumLevel, Severity};
pub use template::Value;
