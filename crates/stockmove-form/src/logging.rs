//! Logging bootstrap.
//!
//! Installs a global `tracing` subscriber from [`LoggingConfig`]. `RUST_LOG`
//! takes precedence over the configured level.

use stockmove_core::config::LoggingConfig;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event.
    #[default]
    Console,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parse a format string (case-insensitive, defaults to Console).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Console,
        }
    }
}

/// Filter for `level`, unless `RUST_LOG` is set.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.trim()))
}

/// Install the global subscriber. Fails when one is already installed.
pub fn init_logging(cfg: &LoggingConfig) -> Result<(), String> {
    let filter = build_filter(&cfg.level);
    let result = match LogFormat::parse(&cfg.format) {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Console => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|err| format!("initialize logging: {err}"))
}
