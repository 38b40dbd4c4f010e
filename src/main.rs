#[cfg(test)]
extern crate predicates;

use clap::{AppSettings, Parser};
use sevlog::{initialization, LogPanic, LoggerFlags, Severity, Value};

#[derive(Parser, Debug)]
#[clap(
    name = "sevlog",
    version,
    long_version = long_version_output(),
    verbatim_doc_comment,
    setting(AppSettings::DeriveDisplayOrder),
    setting(AppSettings::AllowNegativeNumbers)
)]
/**
Write a single log record to stdout or stderr.

## Usage examples

    sevlog INFO "service started"
      Log an INFO record to stderr.

    sevlog --logger.output=stdout WARN "x=%d" 5
      Log a WARN record with the message "x=5" to stdout.

    sevlog --logger.level=ERROR WARN "dropped"
      Nothing is logged, WARN is below the minimum level.

    sevlog FATAL "disk full"
      Log a FATAL record and exit with status 1.

The template uses printf style verbs: %v %s %d %q %x %X %o %b %f %e %g %t %c %T.
*/
struct Cli {
    #[clap(flatten)]
    logger: LoggerFlags,

    /// Severity of the record: INFO, WARN, ERROR, FATAL or PANIC
    #[clap(name = "LEVEL")]
    level: Severity,

    /// Message template
    #[clap(name = "TEMPLATE")]
    template: String,

    /// Template arguments. Integers, floats and true/false are typed, everything else is a
    /// string.
    #[clap(name = "ARGS")]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    let logger = initialization(&cli.logger);
    silence_log_panics();

    let values = cli
        .args
        .iter()
        .map(|arg| Value::sniff(arg))
        .collect::<Vec<Value>>();
    logger.emit(cli.level, &cli.template, &values);
}

// The record is already written when a PANIC unwinds out of main, don't print it twice.
fn silence_log_panics() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if info.payload().downcast_ref::<LogPanic>().is_none() {
            default_hook(info)
        }
    }));
}

// Print the long version label including the target for which it was built
fn long_version_output() -> &'static str {
    concat!(
        clap::crate_version!(),
        "\n",
        env!("SEVLOG_BUILD_TARGET")
    )
}
