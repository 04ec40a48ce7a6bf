//! Configuration traits and utilities.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::args::ConfigSource;
use crate::error::{BridgeError, Result};
use crate::{LoggingConfig, SinkConfig};

/// Trait for bridge configuration types.
///
/// Implement this trait for your bridge's configuration struct to get
/// automatic loading, validation, and access to common config fields.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use tsmetrics_bridge_framework::{BridgeConfig, LoggingConfig, SinkConfig};
///
/// #[derive(Debug, Default, Deserialize)]
/// pub struct MyBridgeConfig {
///     pub sink: SinkConfig,
///     pub logging: LoggingConfig,
///     pub my_protocol: MyProtocolConfig,
/// }
///
/// impl BridgeConfig for MyBridgeConfig {
///     fn sink(&self) -> &SinkConfig {
///         &self.sink
///     }
///
///     fn logging(&self) -> &LoggingConfig {
///         &self.logging
///     }
/// }
/// ```
pub trait BridgeConfig: Sized + DeserializeOwned {
    /// Get the metrics sink configuration.
    fn sink(&self) -> &SinkConfig;

    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. The default checks that the sink
    /// URL parses; overrides should call [`validate_sink`](Self::validate_sink).
    fn validate(&self) -> Result<()> {
        self.validate_sink()
    }

    /// Check that the sink URL is a usable endpoint.
    fn validate_sink(&self) -> Result<()> {
        self.sink()
            .endpoint()
            .map(|_| ())
            .map_err(|e| BridgeError::validation(e.to_string()))
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::with_context(format!("Failed to read {}", path.display()), e)
        })?;
        let config: Self = json5::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Load from a resolved [`ConfigSource`], falling back to `Default`.
    ///
    /// Built-in defaults are returned unvalidated so callers can apply CLI
    /// overrides before calling [`validate`](Self::validate).
    fn load_from_source(source: &ConfigSource) -> Result<Self>
    where
        Self: Default,
    {
        match source {
            ConfigSource::Explicit(path) | ConfigSource::Default(path) => Self::load(path),
            ConfigSource::Builtin => Ok(Self::default()),
        }
    }
}
