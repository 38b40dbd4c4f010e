use chrono::{DateTime, Utc};

use crate::location::CallSite;
use crate::severity::Severity;

/// RFC 3339 with millisecond precision. Timestamps are always UTC, hence the literal `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A single rendered log line. Built per call and dropped after it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub location: CallSite<'a>,
    pub message: &'a str,
}

impl<'a> LogRecord<'a> {
    pub fn new(severity: Severity, location: CallSite<'a>, message: &'a str) -> Self {
        Self::at(Utc::now(), severity, location, message)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        severity: Severity,
        location: CallSite<'a>,
        message: &'a str,
    ) -> Self {
        Self {
            timestamp,
            severity,
            location,
            message: trim_trailing_newlines(message),
        }
    }

    /// Render the record as four tab separated fields terminated by a single newline.
    pub fn render(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity,
            self.location,
            self.message
        )
    }
}

pub fn trim_trailing_newlines(message: &str) -> &str {
    message.trim_end_matches('\n')
}
