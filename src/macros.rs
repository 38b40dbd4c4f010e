//! Logging macros taking `format!` style arguments.
//!
//! ```
//! use sevlog::{log_warn, Logger};
//!
//! let logger = Logger::builder().writer(std::io::sink()).build();
//! log_warn!(logger, "retrying in {}s", 5);
//! ```

/// Log at an explicit [`Severity`](crate::Severity) from the macro call site.
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log_args(
            $severity,
            $crate::CallSite::new(file!(), line!()),
            format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Severity::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Severity::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Exits the process after writing, unless the minimum level is PANIC.
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Severity::Fatal, $($arg)+)
    };
}

/// Unwinds with a [`LogPanic`](crate::LogPanic) after writing.
#[macro_export]
macro_rules! log_panic {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panic_args(
            $crate::CallSite::new(file!(), line!()),
            format_args!($($arg)+),
        )
    };
}
