//! tsmetrics Common Library
//!
//! This crate provides shared types and utilities for tsmetrics bridges:
//!
//! - [`measurement`] - Measurement data model (`Measurement`, `FieldValue`)
//! - [`line_protocol`] - InfluxDB line protocol encoding
//! - [`transport`] - Sink endpoints (unix, TCP, UDP) and connections
//! - [`config`] - Sink and logging configuration sections
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod line_protocol;
pub mod measurement;
pub mod transport;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, SinkConfig};
pub use error::{Error, Result};
pub use line_protocol::encode;
pub use measurement::{FieldValue, Measurement};
pub use transport::{SinkConnection, SinkEndpoint, connect};

/// Initialize tracing with the given configuration.
///
/// Logs go to stderr so stdout stays free for the process's own output.
/// `RUST_LOG`, when set, takes precedence over the configured level.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// # Example
///
/// ```ignore
/// use tsmetrics_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
