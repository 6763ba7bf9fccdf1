//! Logging setup shared by the Steeplecast binaries
//!
//! Output goes to stderr so stdout stays clean for piped command output.
//! `STEEPLECAST_LOG_FORMAT` selects text, json or pretty rendering and
//! `STEEPLECAST_LOG_LEVEL` (or a full `RUST_LOG` filter) sets the level.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text, suitable for terminals and pipes
    Text,
    /// One JSON object per line, for log collectors
    Json,
    /// Multi-line colored output for development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        write!(f, "{}", s)
    }
}

/// Install the global subscriber with an explicit format and fallback level
///
/// A `RUST_LOG` filter in the environment wins over `fallback_level`.
/// Must be called at most once per process.
pub fn init(format: LogFormat, fallback_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
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

/// Install the global subscriber from the environment
///
/// Reads `STEEPLECAST_LOG_FORMAT` and `STEEPLECAST_LOG_LEVEL`, defaulting to
/// text at the given level. The binaries pass "info" normally and "debug"
/// when `--verbose` is set.
pub fn init_from_env(fallback_level: &str) {
    let format = std::env::var("STEEPLECAST_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text);

    let level = std::env::var("STEEPLECAST_LOG_LEVEL")
        .unwrap_or_else(|_| fallback_level.to_string());

    init(format, &level);
}
