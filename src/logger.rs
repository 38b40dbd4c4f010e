use log::{LevelFilter, Metadata, Record};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::location::{CallSite, ROOT_MARKER};
use crate::output::{Output, Sink};
use crate::record::LogRecord;
use crate::severity::{MinimumLevel, Severity};
use crate::template::{self, Value};

/// Exit status of the process after a FATAL record.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Unwind payload raised after a PANIC record is written.
///
/// Intercept it with [`std::panic::catch_unwind`] and downcast the payload:
///
/// ```
/// use sevlog::{LogPanic, Logger};
/// use std::panic::{catch_unwind, AssertUnwindSafe};
///
/// let logger = Logger::builder().writer(std::io::sink()).build();
/// let payload = catch_unwind(AssertUnwindSafe(|| logger.panic("invariant broken", &[])))
///     .unwrap_err();
/// assert_eq!(payload.downcast_ref::<LogPanic>().unwrap().message(), "invariant broken");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPanic {
    message: String,
}

impl LogPanic {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LogPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LogPanic {}

/// Handle to a configured logger.
///
/// Build it once at startup and hand out clones; all clones share the same configuration and
/// the same output, and lines written through any of them never interleave.
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    minimum: MinimumLevel,
    root_marker: String,
    sink: Sink,
}

pub struct LoggerBuilder {
    minimum: MinimumLevel,
    output: Output,
    writer: Option<Box<dyn Write + Send>>,
    root_marker: String,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            minimum: MinimumLevel::default(),
            output: Output::default(),
            writer: None,
            root_marker: ROOT_MARKER.to_string(),
        }
    }

    /// Accepts a [`Severity`], or any string. Strings that are not a severity name produce a
    /// logger that emits every record.
    pub fn minimum_level(mut self, minimum: impl Into<MinimumLevel>) -> Self {
        self.minimum = minimum.into();
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Write records to `writer` instead of a standard stream.
    pub fn writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    pub fn root_marker(mut self, marker: impl Into<String>) -> Self {
        self.root_marker = marker.into();
        self
    }

    pub fn build(self) -> Logger {
        let writer: Box<dyn Write + Send> = match self.writer {
            Some(writer) => writer,
            None => Box::new(self.output.stream()),
        };
        Logger {
            inner: Arc::new(Inner {
                minimum: self.minimum,
                root_marker: self.root_marker,
                sink: Sink::new(writer),
            }),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Logger {
    /// INFO and above to stderr.
    fn default() -> Self {
        LoggerBuilder::new().build()
    }
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn minimum_level(&self) -> &MinimumLevel {
        &self.inner.minimum
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        !self.inner.minimum.should_skip(severity)
    }

    #[track_caller]
    pub fn info(&self, template: &str, args: &[Value]) {
        self.emit(Severity::Info, template, args)
    }

    #[track_caller]
    pub fn warn(&self, template: &str, args: &[Value]) {
        self.emit(Severity::Warn, template, args)
    }

    #[track_caller]
    pub fn error(&self, template: &str, args: &[Value]) {
        self.emit(Severity::Error, template, args)
    }

    /// Write a FATAL record and exit the process with [`FATAL_EXIT_CODE`].
    ///
    /// Returns without doing anything when the minimum level is PANIC.
    #[track_caller]
    pub fn fatal(&self, template: &str, args: &[Value]) {
        self.emit(Severity::Fatal, template, args)
    }

    /// Write a PANIC record and unwind with a [`LogPanic`] carrying the message.
    #[track_caller]
    pub fn panic(&self, template: &str, args: &[Value]) -> ! {
        let message = template::format(template, args);
        self.panic_with(CallSite::caller(), &message)
    }

    /// Log at `severity` from the caller's location.
    #[track_caller]
    pub fn emit(&self, severity: Severity, template: &str, args: &[Value]) {
        if !self.enabled(severity) {
            return;
        }
        let message = template::format(template, args);
        self.dispatch(severity, CallSite::caller(), &message)
    }

    /// Log pre-formatted arguments from an explicit location. Used by the `log_*!` macros.
    pub fn log_args(&self, severity: Severity, location: CallSite<'_>, args: fmt::Arguments<'_>) {
        if !self.enabled(severity) {
            return;
        }
        let message = fmt::format(args);
        self.dispatch(severity, location, &message)
    }

    /// Like [`Logger::log_args`] at PANIC. Used by `log_panic!`.
    pub fn panic_args(&self, location: CallSite<'_>, args: fmt::Arguments<'_>) -> ! {
        let message = fmt::format(args);
        self.panic_with(location, &message)
    }

    fn dispatch(&self, severity: Severity, location: CallSite<'_>, message: &str) {
        match severity {
            Severity::Panic => self.panic_with(location, message),
            Severity::Fatal => {
                self.write(severity, location, message);
                std::process::exit(FATAL_EXIT_CODE)
            }
            Severity::Info | Severity::Warn | Severity::Error => {
                self.write(severity, location, message);
            }
        }
    }

    // PANIC is the highest severity, no minimum level filters it out.
    fn panic_with(&self, location: CallSite<'_>, message: &str) -> ! {
        let message = self.write(Severity::Panic, location, message);
        std::panic::panic_any(LogPanic { message })
    }

    // Returns the message as written, without trailing newlines.
    fn write(&self, severity: Severity, location: CallSite<'_>, message: &str) -> String {
        let record = LogRecord::new(
            severity,
            location.relative_to(&self.inner.root_marker),
            message,
        );
        self.inner.sink.write_line(&record.render());
        record.message.to_string()
    }

    /// Register a clone of this logger as the global `log` facade logger.
    pub fn install(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))
            .map(|()| log::set_max_level(self.level_filter()))
    }

    fn level_filter(&self) -> LevelFilter {
        match &self.inner.minimum {
            MinimumLevel::Severity(Severity::Info) | MinimumLevel::Unrecognized(_) => {
                LevelFilter::Info
            }
            MinimumLevel::Severity(Severity::Warn) => LevelFilter::Warn,
            MinimumLevel::Severity(Severity::Error) => LevelFilter::Error,
            MinimumLevel::Severity(Severity::Fatal) | MinimumLevel::Severity(Severity::Panic) => {
                LevelFilter::Off
            }
        }
    }
}

// `log` has no FATAL or PANIC. DEBUG and TRACE have no severity and are never logged.
fn severity_for(level: log::Level) -> Option<Severity> {
    match level {
        log::Level::Error => Some(Severity::Error),
        log::Level::Warn => Some(Severity::Warn),
        log::Level::Info => Some(Severity::Info),
        log::Level::Debug | log::Level::Trace => None,
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        severity_for(metadata.level()).map_or(false, |severity| Logger::enabled(self, severity))
    }

    fn log(&self, record: &Record) {
        let severity = match severity_for(record.level()) {
            Some(severity) => severity,
            None => return,
        };
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => CallSite::new(file, line),
            _ => CallSite::UNKNOWN,
        };
        self.log_args(severity, location, *record.args());
    }

    fn flush(&self) {
        self.inner.sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::{severity_for, LogPanic, Logger};
    use crate::location::CallSite;
    use crate::severity::{MinimumLevel, Severity};
    use crate::template::Value;
    use crate::test::*;
    use log::{LevelFilter, Log, Record};
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::thread;

    #[test]
    fn warn_minimum_scenario() {
        let (logger, capture) = capturing_logger(Severity::Warn);
        logger.info("ignored", &[]);
        assert_eq!(capture.contents(), "");

        let line_number = line!() + 1;
        logger.warn("x=%d", &[Value::from(5)]);
        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        let fields = fields(&lines[0]);
        assert_timestamp(fields[0]);
        assert_eq!(fields[1], "WARN");
        assert_eq!(fields[2], format!("{}:{}", file!(), line_number));
        assert_eq!(fields[3], "x=5");
    }

    #[test]
    fn error_scenario() {
        let (logger, capture) = capturing_logger(Severity::Info);
        logger.error("boom: %s", &["io".into()]);
        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        let fields = fields(&lines[0]);
        assert_eq!(fields[1], "ERROR");
        assert_eq!(fields[3], "boom: io");
    }

    #[test]
    fn oversized_verbs_are_logged_inline() {
        let (logger, capture) = capturing_logger(Severity::Info);
        logger.info("[%18446744073709551615d]", &[1.into()]);
        logger.warn("[%.18446744073709551615f]", &[1.5.into()]);
        let messages = capture
            .lines()
            .iter()
            .map(|line| fields(line)[3].to_string())
            .collect::<Vec<String>>();
        assert_eq!(messages, vec!["[%!(BADWIDTH)1]", "[%!(BADPREC)1.500000]"]);
    }

    #[test]
    fn emits_iff_at_or_above_minimum() {
        for minimum in [Severity::Info, Severity::Warn, Severity::Error] {
            let (logger, capture) = capturing_logger(minimum);
            logger.info("info", &[]);
            logger.warn("warn", &[]);
            logger.error("error", &[]);
            let levels = capture
                .lines()
                .iter()
                .map(|line| fields(line)[1].to_string())
                .collect::<Vec<String>>();
            let expected = [Severity::Info, Severity::Warn, Severity::Error]
                .iter()
                .filter(|level| **level >= minimum)
                .map(|level| level.to_string())
                .collect::<Vec<String>>();
            assert_eq!(levels, expected, "minimum {}", minimum);
        }
    }

    #[test]
    fn unrecognized_minimum_emits_everything() {
        let (logger, capture) = capturing_logger("DEBUG");
        assert_eq!(
            logger.minimum_level(),
            &MinimumLevel::Unrecognized("DEBUG".to_string())
        );
        logger.info("a", &[]);
        logger.warn("b", &[]);
        logger.error("c", &[]);
        assert_eq!(capture.lines().len(), 3);
    }

    #[test]
    fn fatal_is_skipped_below_panic_minimum() {
        // Reaching the assertion proves the process did not exit.
        let (logger, capture) = capturing_logger(Severity::Panic);
        logger.fatal("disk full", &[]);
        logger.error("ignored", &[]);
        assert_eq!(capture.contents(), "");
    }

    #[test]
    fn panic_writes_line_then_unwinds() {
        let (logger, capture) = capturing_logger(Severity::Panic);
        let result = catch_unwind(AssertUnwindSafe(|| {
            logger.panic("invariant broken\n\n", &[]);
        }));
        let payload = result.unwrap_err();
        let panic = payload.downcast_ref::<LogPanic>().expect("LogPanic payload");
        assert_eq!(panic.message(), "invariant broken");
        assert_eq!(panic.to_string(), "invariant broken");

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(fields(&lines[0])[1], "PANIC");
        assert_eq!(fields(&lines[0])[3], "invariant broken");
    }

    #[test]
    fn panic_through_emit_unwinds() {
        let (logger, capture) = capturing_logger("anything");
        let result = catch_unwind(AssertUnwindSafe(|| {
            logger.emit(Severity::Panic, "code %d", &[7.into()]);
        }));
        let payload = result.unwrap_err();
        assert_eq!(
            payload.downcast_ref::<LogPanic>().map(LogPanic::message),
            Some("code 7")
        );
        assert_eq!(capture.lines().len(), 1);
    }

    #[test]
    fn logger_usable_after_panic() {
        let (logger, capture) = capturing_logger(Severity::Info);
        let _ = catch_unwind(AssertUnwindSafe(|| logger.panic("first", &[])));
        logger.info("second", &[]);
        let lines = capture.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(fields(&lines[1])[3], "second");
    }

    #[test]
    fn trailing_newlines_are_trimmed() {
        let (logger, capture) = capturing_logger(Severity::Info);
        logger.info("one\n", &[]);
        logger.info("two\n\n\n", &[]);
        logger.info("%s", &["three\n".into()]);
        let messages = capture
            .lines()
            .iter()
            .map(|line| fields(line)[3].to_string())
            .collect::<Vec<String>>();
        assert_eq!(messages, vec!["one", "two", "three"]);
        assert!(!capture.contents().contains("\n\n"));
    }

    #[test]
    fn root_marker_is_stripped() {
        let capture = Capture::default();
        let logger = Logger::builder()
            .writer(capture.clone())
            .root_marker("src/")
            .build();
        logger.info("relative", &[]);
        let lines = capture.lines();
        let location = fields(&lines[0])[2];
        assert!(location.starts_with("logger.rs:"), "{}", location);
    }

    #[test]
    fn macros_capture_call_site() {
        let (logger, capture) = capturing_logger(Severity::Info);
        let line_number = line!() + 1;
        crate::log_warn!(logger, "x={} y={:?}", 5, "io");
        crate::log_info!(logger, "plain");
        let lines = capture.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(fields(&lines[0])[1], "WARN");
        assert_eq!(fields(&lines[0])[2], format!("{}:{}", file!(), line_number));
        assert_eq!(fields(&lines[0])[3], "x=5 y=\"io\"");
        assert_eq!(fields(&lines[1])[3], "plain");
    }

    #[test]
    fn macros_respect_minimum() {
        let (logger, capture) = capturing_logger(Severity::Error);
        crate::log_info!(logger, "no");
        crate::log_warn!(logger, "no");
        crate::log_error!(logger, "yes {}", 1);
        let fatal_skipped = Logger::builder()
            .minimum_level(Severity::Panic)
            .writer(capture.clone())
            .build();
        crate::log_fatal!(fatal_skipped, "no");
        assert_eq!(capture.lines().len(), 1);
    }

    #[test]
    fn log_panic_macro_unwinds() {
        let (logger, capture) = capturing_logger(Severity::Info);
        let result = catch_unwind(AssertUnwindSafe(|| {
            crate::log_panic!(logger, "bad state {}", 3);
        }));
        let payload = result.unwrap_err();
        assert_eq!(
            payload.downcast_ref::<LogPanic>().map(LogPanic::message),
            Some("bad state 3")
        );
        assert_eq!(fields(&capture.lines()[0])[1], "PANIC");
    }

    #[test]
    fn concurrent_lines_do_not_interleave() {
        let (logger, capture) = capturing_logger(Severity::Info);
        let handles = (0..8)
            .map(|thread_index| {
                let logger = logger.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        logger.warn(
                            "thread %d line %d %s",
                            &[thread_index.into(), i.into(), "x".repeat(200).into()],
                        );
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("logging thread panicked");
        }

        let lines = capture.lines();
        assert_eq!(lines.len(), 800);
        for line in lines {
            let fields = fields(&line);
            assert_eq!(fields.len(), 4, "{:?}", line);
            assert_timestamp(fields[0]);
            assert_eq!(fields[1], "WARN");
            assert!(fields[3].starts_with("thread "));
            assert!(fields[3].ends_with(&"x".repeat(200)));
        }
    }

    #[test]
    fn log_facade_records() {
        let (logger, capture) = capturing_logger(Severity::Warn);
        logger.log(
            &Record::builder()
                .level(log::Level::Warn)
                .args(format_args!("from {}", "facade"))
                .file(Some("/build/sevlog/src/app.rs"))
                .line(Some(9))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(log::Level::Info)
                .args(format_args!("filtered"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(log::Level::Error)
                .args(format_args!("no location"))
                .build(),
        );
        let lines = capture.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(fields(&lines[0])[1..], ["WARN", "src/app.rs:9", "from facade"]);
        assert_eq!(fields(&lines[1])[1..], ["ERROR", "???:0", "no location"]);
    }

    #[test]
    fn log_facade_enabled() {
        let (logger, _capture) = capturing_logger(Severity::Warn);
        let metadata = |level| log::Metadata::builder().level(level).build();
        assert!(!Log::enabled(&logger, &metadata(log::Level::Trace)));
        assert!(!Log::enabled(&logger, &metadata(log::Level::Debug)));
        assert!(!Log::enabled(&logger, &metadata(log::Level::Info)));
        assert!(Log::enabled(&logger, &metadata(log::Level::Warn)));
        assert!(Log::enabled(&logger, &metadata(log::Level::Error)));
    }

    #[test]
    fn log_levels_map_to_severities() {
        assert_eq!(severity_for(log::Level::Error), Some(Severity::Error));
        assert_eq!(severity_for(log::Level::Info), Some(Severity::Info));
        assert_eq!(severity_for(log::Level::Debug), None);
        assert_eq!(capturing_logger(Severity::Fatal).0.level_filter(), LevelFilter::Off);
        assert_eq!(capturing_logger("DEBUG").0.level_filter(), LevelFilter::Info);
        assert_eq!(capturing_logger(Severity::Warn).0.level_filter(), LevelFilter::Warn);
    }

    #[test]
    fn default_logger_configuration() {
        let logger = Logger::default();
        assert_eq!(logger.minimum_level(), &MinimumLevel::Severity(Severity::Info));
        assert!(logger.enabled(Severity::Info));
        assert_eq!(CallSite::UNKNOWN.to_string(), "???:0");
    }
}
