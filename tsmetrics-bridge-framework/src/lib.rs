//! tsmetrics Bridge Framework
//!
//! Common abstractions for building bridges that poll a source and write
//! measurements to a Telegraf socket listener.
//!
//! # Overview
//!
//! This framework provides:
//! - [`BridgeConfig`] trait for configuration loading and validation
//! - [`BridgeRunner`] for managing bridge lifecycle (startup, shutdown, signal handling)
//! - [`Publisher`] for writing measurements to the sink as line protocol
//! - [`MeasurementSink`] as the seam workers write through
//! - [`BridgeArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use tsmetrics_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = <BridgeArgs as clap::Parser>::parse();
//!     let config = MyBridgeConfig::load_from_source(&args.config_source("mybridge.json5"))?;
//!
//!     let mut runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
//!
//!     // Spawn protocol-specific workers
//!     runner.spawn_with_error("worker", my_worker(runner.publisher()));
//!
//!     // Run until Ctrl+C or a worker failure
//!     Ok(runner.run().await?)
//! }
//! ```

mod args;
mod config;
mod error;
mod publisher;
mod runner;

pub use args::{BridgeArgs, ConfigSource};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use publisher::{MeasurementSink, Publisher};
pub use runner::BridgeRunner;

// Re-export commonly used types from tsmetrics-common
pub use tsmetrics_common::{FieldValue, LogFormat, LoggingConfig, Measurement, SinkConfig};
