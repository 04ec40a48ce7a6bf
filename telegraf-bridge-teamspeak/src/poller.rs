//! Periodic collection of virtual server statistics.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tsmetrics_bridge_framework::{BridgeError, MeasurementSink};

use crate::config::TeamspeakConfig;
use crate::enumerator::list_servers;
use crate::error::CollectError;
use crate::mapper::to_measurement;
use crate::query::QuerySession;

/// Error type for polling operations.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Collection failed: {0}")]
    Collect(#[from] CollectError),
    #[error("Write failed: {0}")]
    Write(#[from] BridgeError),
}

/// Polls one ServerQuery session and writes a measurement per virtual server.
///
/// The poller owns the session for its lifetime. Ticks never overlap, and
/// the first failure ends [`run`](Self::run).
pub struct TeamspeakPoller<S, W> {
    session: S,
    sink: W,
    interval: Duration,
    list_options: Vec<String>,
}

impl<S, W> TeamspeakPoller<S, W>
where
    S: QuerySession,
    W: MeasurementSink,
{
    /// Create a poller over an authenticated session.
    pub fn new(session: S, sink: W, config: &TeamspeakConfig) -> Self {
        Self {
            session,
            sink,
            interval: config.poll_interval(),
            list_options: config.list_options.clone(),
        }
    }

    /// Poll until the first failure, which is returned.
    ///
    /// The first poll happens immediately.
    pub async fn run(mut self) -> Result<(), PollerError> {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting TeamSpeak poller"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let count = self.poll_once().await?;
            debug!(servers = count, "Published server measurements");
        }
    }

    /// Collect all virtual servers once and write their measurements.
    ///
    /// Returns the number of measurements written. Collection completes
    /// before anything is written, so a failed collection writes nothing.
    pub async fn poll_once(&mut self) -> Result<usize, PollerError> {
        let servers = list_servers(&mut self.session, &self.list_options).await?;

        for server in &servers {
            self.sink.write(&to_measurement(server)).await?;
        }

        Ok(servers.len())
    }

    /// Take back the session and sink.
    pub fn into_parts(self) -> (S, W) {
        (self.session, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Command, Properties, QueryError, Response};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tsmetrics_bridge_framework::{FieldValue, Measurement};

    /// Session with a fixed listing; every other command succeeds.
    struct ScriptedSession {
        listing: Vec<Properties>,
        commands: Vec<String>,
        fail_info: bool,
    }

    impl ScriptedSession {
        fn new(listing: Vec<Properties>) -> Self {
            Self {
                listing,
                commands: Vec::new(),
                fail_info: false,
            }
        }
    }

    #[async_trait]
    impl QuerySession for ScriptedSession {
        async fn execute(&mut self, command: &Command) -> Result<Response, QueryError> {
            self.commands.push(command.encode());
            let records = match command.name() {
                "serverlist" => self.listing.clone(),
                "whoami" => vec![Properties::default().with("virtualserver_port", "9987")],
                "serverinfo" if self.fail_info => {
                    return Err(QueryError::Server {
                        id: 1024,
                        message: "invalid serverID".to_string(),
                    });
                }
                "serverinfo" => vec![
                    Properties::default()
                        .with("virtualserver_id", "1")
                        .with("virtualserver_port", "9987")
                        .with("virtualserver_status", "online")
                        .with("virtualserver_clientsonline", "5")
                        .with("virtualserver_queryclientsonline", "1"),
                ],
                _ => Vec::new(),
            };
            Ok(Response { records })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        written: Arc<Mutex<Vec<Measurement>>>,
        reject: bool,
    }

    #[async_trait]
    impl MeasurementSink for RecordingSink {
        async fn write(
            &self,
            measurement: &Measurement,
        ) -> tsmetrics_bridge_framework::Result<()> {
            if self.reject {
                return Err(BridgeError::Publish {
                    endpoint: "udp:127.0.0.1:8094".to_string(),
                    measurement: measurement.name.clone(),
                    message: "connection refused".to_string(),
                });
            }
            self.written.lock().unwrap().push(measurement.clone());
            Ok(())
        }
    }

    fn listing() -> Vec<Properties> {
        vec![
            Properties::default()
                .with("virtualserver_id", "1")
                .with("virtualserver_port", "9987")
                .with("virtualserver_status", "online"),
            Properties::default()
                .with("virtualserver_id", "2")
                .with("virtualserver_port", "9988")
                .with("virtualserver_status", "offline"),
        ]
    }

    fn config() -> TeamspeakConfig {
        TeamspeakConfig {
            poll_interval_secs: 1,
            ..TeamspeakConfig::default()
        }
    }

    #[tokio::test]
    async fn test_poll_once_writes_each_server() {
        let sink = RecordingSink::default();
        let mut poller =
            TeamspeakPoller::new(ScriptedSession::new(listing()), sink.clone(), &config());

        let count = tokio_test::assert_ok!(poller.poll_once().await);
        assert_eq!(count, 2);

        let written = sink.written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].tag("port"), Some("9987"));
        assert_eq!(written[0].field("v_clients"), Some(&FieldValue::UInt64(4)));
        assert_eq!(written[1].tag("port"), Some("9988"));
        assert_eq!(written[1].field("online"), Some(&FieldValue::Boolean(false)));
    }

    #[tokio::test]
    async fn test_collection_failure_writes_nothing() {
        let mut session = ScriptedSession::new(listing());
        session.fail_info = true;
        let sink = RecordingSink::default();
        let mut poller = TeamspeakPoller::new(session, sink.clone(), &config());

        let err = poller.poll_once().await.unwrap_err();

        assert!(matches!(err, PollerError::Collect(CollectError::Command { .. })));
        assert!(sink.written.lock().unwrap().is_empty());

        let (session, _) = poller.into_parts();
        assert_eq!(session.commands.last().unwrap(), "use port=9987");
    }

    #[tokio::test]
    async fn test_write_failure_is_returned() {
        let sink = RecordingSink {
            reject: true,
            ..RecordingSink::default()
        };
        let mut poller = TeamspeakPoller::new(ScriptedSession::new(listing()), sink, &config());

        let err = poller.poll_once().await.unwrap_err();
        assert!(matches!(err, PollerError::Write(BridgeError::Publish { .. })));
    }

    #[tokio::test]
    async fn test_run_stops_on_first_failure() {
        let sink = RecordingSink {
            reject: true,
            ..RecordingSink::default()
        };
        let poller = TeamspeakPoller::new(ScriptedSession::new(listing()), sink, &config());

        let result = tokio::time::timeout(Duration::from_secs(5), poller.run()).await;
        assert!(matches!(result, Ok(Err(PollerError::Write(_)))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_interval() {
        let sink = RecordingSink::default();
        let poller =
            TeamspeakPoller::new(ScriptedSession::new(listing()), sink.clone(), &config());
        let handle = tokio::spawn(poller.run());

        // First tick is immediate, then one per second.
        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.abort();

        assert_eq!(sink.written.lock().unwrap().len(), 6);
    }
}
