//! Configuration for the TeamSpeak bridge.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tsmetrics_bridge_framework::{BridgeConfig, BridgeError, LoggingConfig, Result, SinkConfig};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "teamspeak.json5";

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamspeakBridgeConfig {
    /// Telegraf socket listener settings
    #[serde(default)]
    pub sink: SinkConfig,

    /// ServerQuery settings
    #[serde(default)]
    pub teamspeak: TeamspeakConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// ServerQuery connection and polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamspeakConfig {
    /// ServerQuery address as `host:port` (default: "127.0.0.1:10011")
    #[serde(default = "default_server")]
    pub server: String,

    /// Query login name (default: "serveradmin")
    #[serde(default = "default_username")]
    pub username: String,

    /// Query login password
    #[serde(default)]
    pub password: String,

    /// Poll interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Timeout for connecting and for each command, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra options passed to `serverlist`, e.g. `["-uid"]`
    #[serde(default)]
    pub list_options: Vec<String>,
}

fn default_server() -> String {
    "127.0.0.1:10011".to_string()
}

fn default_username() -> String {
    "serveradmin".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for TeamspeakConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            username: default_username(),
            password: String::new(),
            poll_interval_secs: default_poll_interval(),
            timeout_ms: default_timeout_ms(),
            list_options: Vec::new(),
        }
    }
}

impl TeamspeakConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Values given on the command line, applied over the loaded file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub output: Option<String>,
}

impl TeamspeakBridgeConfig {
    /// Apply command line overrides. Unset values keep the configured ones.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(server) = overrides.server {
            self.teamspeak.server = server;
        }
        if let Some(username) = overrides.username {
            self.teamspeak.username = username;
        }
        if let Some(password) = overrides.password {
            self.teamspeak.password = password;
        }
        if let Some(output) = overrides.output {
            self.sink.url = output;
        }
    }
}

impl BridgeConfig for TeamspeakBridgeConfig {
    fn sink(&self) -> &SinkConfig {
        &self.sink
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> Result<()> {
        self.validate_sink()?;

        let ts = &self.teamspeak;

        if ts.server.trim().is_empty() {
            return Err(BridgeError::validation("teamspeak.server must not be empty"));
        }

        if ts.poll_interval_secs == 0 {
            return Err(BridgeError::validation(
                "teamspeak.poll_interval_secs must be greater than 0",
            ));
        }

        if ts.timeout_ms == 0 {
            return Err(BridgeError::validation(
                "teamspeak.timeout_ms must be greater than 0",
            ));
        }

        for option in &ts.list_options {
            if !option.starts_with('-') || option.len() < 2 || option.contains(char::is_whitespace)
            {
                return Err(BridgeError::validation(format!(
                    "teamspeak.list_options: '{}' is not a ServerQuery option",
                    option
                )));
            }
        }

        Ok(())
    }
}
