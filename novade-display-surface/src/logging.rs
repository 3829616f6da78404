//! `tracing` subscriber setup.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::LoggingError;

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// Does nothing if a global subscriber is already set.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_level(level: &str) -> Result<Level, LoggingError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(LoggingError::InvalidLevel(other.to_string())),
    }
}

/// Installs the global stdout subscriber described by `config`.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = parse_level(&config.level)?;
    let filter = EnvFilter::new(level.to_string());

    let result = match config.format.to_lowercase().as_str() {
        "json" => fmt::Subscriber::builder()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .with_ansi(false)
            .try_init(),
        "text" => fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .try_init(),
        other => return Err(LoggingError::InvalidFormat(other.to_string())),
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))
}
