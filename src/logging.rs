// Logging setup
// -------------
// Diagnostics go to stderr through `tracing`, so stdout only carries what
// the user asked for (the service response or a dry-run dump). `RUST_LOG`
// wins over the level chosen on the command line.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format when no flag is given.
pub const LOG_FORMAT_ENV: &str = "SOUNDLROUS_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Plain text without targets
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line with colors
    Pretty,
}

/// Format from the flag, else from `SOUNDLROUS_LOG_FORMAT`, else text.
pub fn format_from_env(flag: Option<LogFormat>) -> LogFormat {
    flag.or_else(|| {
        std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| LogFormat::from_str(s.trim(), true).ok())
    })
    .unwrap_or_default()
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init(format: LogFormat, verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_target(true)
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
}
