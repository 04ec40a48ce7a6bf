//! CLI argument parsing for bridges.

use std::path::{Path, PathBuf};

use clap::Parser;

/// Common CLI arguments for all bridges.
///
/// Bridges with extra flags embed this with `#[command(flatten)]`.
#[derive(Parser, Debug, Clone, Default)]
#[command(about = "tsmetrics bridge")]
pub struct BridgeArgs {
    /// Path to configuration file (JSON5).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Which configuration file to read, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given explicitly; it must exist.
    Explicit(PathBuf),
    /// The bridge's default path, which exists.
    Default(PathBuf),
    /// No file; built-in defaults apply.
    Builtin,
}

impl BridgeArgs {
    /// Resolve the configuration source.
    ///
    /// An explicit `--config` always wins. Otherwise the default path is used
    /// when present, and built-in defaults when it is not.
    pub fn config_source(&self, default_config: impl AsRef<Path>) -> ConfigSource {
        if let Some(path) = &self.config {
            return ConfigSource::Explicit(path.clone());
        }

        let default_config = default_config.as_ref();
        if default_config.exists() {
            ConfigSource::Default(default_config.to_path_buf())
        } else {
            ConfigSource::Builtin
        }
    }
}
