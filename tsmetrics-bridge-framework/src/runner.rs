//! Bridge runner for lifecycle management.

use std::future::Future;

use tokio::signal;
use tokio::task::JoinSet;

use tsmetrics_common::{LoggingConfig, init_tracing};

use crate::BridgeArgs;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::publisher::Publisher;

/// How a worker task ended.
#[derive(Debug)]
struct WorkerExit {
    name: String,
    error: Option<String>,
}

/// Bridge runner that manages the lifecycle of a bridge.
///
/// Handles:
/// - Logging initialization
/// - Sink connection
/// - Task spawning and supervision
/// - Graceful shutdown on Ctrl+C
///
/// A worker that fails stops the whole bridge: [`run`](Self::run) returns
/// the worker's error so the process can exit non-zero.
///
/// # Example
///
/// ```ignore
/// use tsmetrics_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let args = <BridgeArgs as clap::Parser>::parse();
///     let config = MyBridgeConfig::load("mybridge.json5")?;
///
///     let mut runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
///
///     let publisher = runner.publisher();
///     runner.spawn_with_error("poller", async move {
///         // Worker logic here
///         Ok::<(), std::io::Error>(())
///     });
///
///     runner.run().await
/// }
/// ```
pub struct BridgeRunner<C: BridgeConfig> {
    /// Bridge name for logging.
    name: String,
    /// Bridge version.
    version: String,
    /// The loaded configuration.
    config: C,
    /// Publisher for measurements.
    publisher: Publisher,
    /// Spawned tasks.
    tasks: JoinSet<WorkerExit>,
}

impl<C: BridgeConfig> BridgeRunner<C> {
    /// Create a new bridge runner.
    ///
    /// This will:
    /// 1. Initialize logging from the config, with `--log-level` taking precedence
    /// 2. Connect to the metrics sink
    pub async fn new_with_args(
        name: impl Into<String>,
        config: C,
        args: Option<&BridgeArgs>,
    ) -> Result<Self> {
        let name = name.into();

        // Initialize logging with optional CLI override
        let log_config = match args.and_then(|a| a.log_level.as_ref()) {
            Some(level) => LoggingConfig {
                level: level.clone(),
                format: config.logging().format,
            },
            None => config.logging().clone(),
        };

        init_tracing(&log_config).map_err(|e| BridgeError::config(e.to_string()))?;

        tracing::info!(
            bridge = %name,
            version = env!("CARGO_PKG_VERSION"),
            "Starting bridge"
        );

        // Connect to the sink
        let publisher = Publisher::connect(config.sink()).await?;

        Ok(Self::with_publisher(name, config, publisher))
    }

    /// Create a runner around an existing publisher.
    ///
    /// Does not touch the global tracing subscriber.
    pub fn with_publisher(name: impl Into<String>, config: C, publisher: Publisher) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            publisher,
            tasks: JoinSet::new(),
        }
    }

    /// Get the bridge name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the bridge version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Get a clone of the publisher.
    pub fn publisher(&self) -> Publisher {
        self.publisher.clone()
    }

    /// Spawn a worker task.
    ///
    /// The task will be tracked and aborted on shutdown.
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        self.tasks.spawn(async move {
            future.await;
            WorkerExit { name, error: None }
        });
    }

    /// Spawn a worker task that returns a Result.
    ///
    /// An error is logged and ends [`run`](Self::run) with a failure.
    pub fn spawn_with_error<F, E>(&mut self, name: impl Into<String>, future: F)
    where
        F: Future<Output = std::result::Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let name = name.into();
        self.tasks.spawn(async move {
            let error = future.await.err().map(|e| e.to_string());
            if let Some(ref e) = error {
                tracing::error!(worker = %name, error = %e, "Worker failed");
            }
            WorkerExit { name, error }
        });
    }

    /// Run the bridge until Ctrl+C is received or a worker fails.
    ///
    /// This will:
    /// 1. Wait for Ctrl+C, a worker failure, or all workers finishing
    /// 2. Abort the remaining tasks
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(
            bridge = %self.name,
            tasks = self.tasks.len(),
            sink = %self.publisher.endpoint(),
            "Bridge running. Press Ctrl+C to stop."
        );

        let shutdown = signal::ctrl_c();
        tokio::pin!(shutdown);

        let outcome = loop {
            tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    }
                    tracing::info!(bridge = %self.name, "Received shutdown signal");
                    break Ok(());
                }
                joined = self.tasks.join_next() => match joined {
                    Some(Ok(WorkerExit { name, error: None })) => {
                        tracing::info!(worker = %name, "Worker finished");
                    }
                    Some(Ok(WorkerExit { name, error: Some(e) })) => {
                        break Err(BridgeError::worker(format!("{}: {}", name, e)));
                    }
                    Some(Err(e)) => {
                        break Err(BridgeError::worker(format!("task aborted: {}", e)));
                    }
                    None => {
                        tracing::info!(bridge = %self.name, "All workers finished");
                        break Ok(());
                    }
                },
            }
        };

        // Abort all tasks
        self.tasks.shutdown().await;

        match &outcome {
            Ok(()) => tracing::info!(bridge = %self.name, "Goodbye!"),
            Err(e) => tracing::error!(bridge = %self.name, error = %e, "Bridge stopped"),
        }

        outcome
    }
}
