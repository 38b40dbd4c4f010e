use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warn,
    Error,
    /// Terminates the process after the record is written.
    Fatal,
    /// Unwinds with a [`LogPanic`](crate::LogPanic) after the record is written.
    Panic,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
        Severity::Panic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Panic => "PANIC",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSeverityError {
    pub value: String,
}

impl fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown severity {:?}; supported values are: INFO, WARN, ERROR, FATAL, PANIC",
            self.value
        )
    }
}

impl std::error::Error for ParseSeverityError {}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    // Names are matched exactly, "info" is not a valid severity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Severity::Info),
            "WARN" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            "FATAL" => Ok(Severity::Fatal),
            "PANIC" => Ok(Severity::Panic),
            _ => Err(ParseSeverityError {
                value: s.to_string(),
            }),
        }
    }
}

/// Filtering threshold of a logger.
///
/// The validated configuration path only ever produces [`MinimumLevel::Severity`]. A logger
/// built directly from an arbitrary string keeps the raw value as
/// [`MinimumLevel::Unrecognized`], and such a logger emits every record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MinimumLevel {
    Severity(Severity),
    Unrecognized(String),
}

impl MinimumLevel {
    /// Returns `true` when a record of the given severity must be suppressed.
    pub fn should_skip(&self, level: Severity) -> bool {
        match self {
            MinimumLevel::Severity(minimum) => level < *minimum,
            MinimumLevel::Unrecognized(_) => false,
        }
    }
}

impl Default for MinimumLevel {
    fn default() -> Self {
        MinimumLevel::Severity(Severity::Info)
    }
}

impl From<Severity> for MinimumLevel {
    fn from(severity: Severity) -> Self {
        MinimumLevel::Severity(severity)
    }
}

impl From<&str> for MinimumLevel {
    fn from(value: &str) -> Self {
        match value.parse::<Severity>() {
            Ok(severity) => MinimumLevel::Severity(severity),
            Err(_) => MinimumLevel::Unrecognized(value.to_string()),
        }
    }
}

impl fmt::Display for MinimumLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinimumLevel::Severity(severity) => write!(f, "{}", severity),
            MinimumLevel::Unrecognized(value) => write!(f, "{}", value),
        }
    }
}
