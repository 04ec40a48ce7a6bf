use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::SinkEndpoint;

/// Metrics sink (Telegraf socket listener) settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Endpoint URL: `unix:<path>`, `tcp:<host:port>` or `udp:<host:port>`.
    #[serde(default = "default_sink_url")]
    pub url: String,
}

fn default_sink_url() -> String {
    "unix:/var/run/telegraf/telegraf.sock".to_string()
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: default_sink_url(),
        }
    }
}

impl SinkConfig {
    /// Parse the configured URL into an endpoint.
    pub fn endpoint(&self) -> Result<SinkEndpoint> {
        self.url.parse()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
