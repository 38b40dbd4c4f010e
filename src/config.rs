use clap::Args;
use std::fmt;

use crate::logger::Logger;
use crate::output::Output;
use crate::severity::Severity;

/// Exit status when the logger configuration is invalid.
pub const CONFIG_EXIT_CODE: i32 = 2;

/// Logger options for a host command line.
///
/// Embed them in the host's own parser:
///
/// ```
/// use clap::Parser;
/// use sevlog::LoggerFlags;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[clap(flatten)]
///     logger: LoggerFlags,
/// }
///
/// let cli = Cli::parse_from(["app", "--logger.level", "WARN"]);
/// assert_eq!(cli.logger.level, "WARN");
/// assert_eq!(cli.logger.output, "stderr");
/// ```
///
/// Values are kept as given and validated by [`LoggerFlags::try_build`] or [`initialization`].
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LoggerFlags {
    /// Minimum level to log. Possible values: INFO, WARN, ERROR, FATAL, PANIC.
    #[clap(
        long = "logger.level",
        value_name = "LEVEL",
        default_value = "INFO",
        help_heading = "LOGGING"
    )]
    pub level: String,

    /// Output for the logs. Supported values: stderr, stdout.
    #[clap(
        long = "logger.output",
        value_name = "OUTPUT",
        default_value = "stderr",
        help_heading = "LOGGING"
    )]
    pub output: String,
}

impl Default for LoggerFlags {
    fn default() -> Self {
        Self {
            level: Severity::Info.to_string(),
            output: Output::Stderr.to_string(),
        }
    }
}

impl LoggerFlags {
    pub fn minimum_level(&self) -> Result<Severity, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::UnsupportedLevel(self.level.clone()))
    }

    pub fn output(&self) -> Result<Output, ConfigError> {
        self.output
            .parse()
            .map_err(|_| ConfigError::UnsupportedOutput(self.output.clone()))
    }

    /// Validate the level first, then the output, and build the logger.
    pub fn try_build(&self) -> Result<Logger, ConfigError> {
        let minimum = self.minimum_level()?;
        let output = self.output()?;
        Ok(Logger::builder()
            .minimum_level(minimum)
            .output(output)
            .build())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedLevel(String),
    UnsupportedOutput(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedLevel(value) => write!(
                f,
                "unsupported `--logger.level` value: {:?}; supported values are: INFO, WARN, ERROR, FATAL, PANIC",
                value
            ),
            ConfigError::UnsupportedOutput(value) => write!(
                f,
                "unsupported `--logger.output` value: {:?}; supported values are: stderr, stdout",
                value
            ),
        }
    }
}

impl fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError: {}", self)
    }
}

impl std::error::Error for ConfigError {}

/// Build the process logger from its flags, or abort.
///
/// An invalid value is reported straight to stderr, without going through any logger, and
/// the process exits with [`CONFIG_EXIT_CODE`].
pub fn initialization(flags: &LoggerFlags) -> Logger {
    match flags.try_build() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("FATAL: {}", e);
            std::process::exit(CONFIG_EXIT_CODE)
        }
    }
}
