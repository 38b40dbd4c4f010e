use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use termcolor::{ColorChoice, StandardStream};

/// Standard stream log records are written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    Stderr,
    Stdout,
}

impl Output {
    pub fn as_str(&self) -> &'static str {
        match self {
            Output::Stderr => "stderr",
            Output::Stdout => "stdout",
        }
    }

    // Records are plain text, never colored.
    pub(crate) fn stream(&self) -> StandardStream {
        match self {
            Output::Stderr => StandardStream::stderr(ColorChoice::Never),
            Output::Stdout => StandardStream::stdout(ColorChoice::Never),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::Stderr
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutputError {
    pub value: String,
}

impl fmt::Display for ParseOutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown output {:?}; supported values are: stderr, stdout",
            self.value
        )
    }
}

impl std::error::Error for ParseOutputError {}

impl FromStr for Output {
    type Err = ParseOutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stderr" => Ok(Output::Stderr),
            "stdout" => Ok(Output::Stdout),
            _ => Err(ParseOutputError {
                value: s.to_string(),
            }),
        }
    }
}

/// The shared writer. Every line is written and flushed while holding the lock, so lines from
/// concurrent callers never interleave.
pub(crate) struct Sink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Sink {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    // Write failures are dropped: logging calls have no way to report them.
    pub fn write_line(&self, line: &str) {
        let mut writer = self.lock();
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    pub fn flush(&self) {
        let _ = self.lock().flush();
    }

    // A writer that panicked mid-write is still usable for the next line.
    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sink")
    }
}
