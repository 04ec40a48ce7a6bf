//! Measurement publisher for the metrics sink.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tsmetrics_common::{Measurement, SinkConfig, SinkConnection, SinkEndpoint, encode};

use crate::error::{BridgeError, Result};

/// Destination for measurements produced by a bridge worker.
///
/// [`Publisher`] is the production implementation; workers take any sink so
/// they can be exercised against in-memory recorders.
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    /// Write one measurement.
    async fn write(&self, measurement: &Measurement) -> Result<()>;
}

/// Publisher for sending measurements to Telegraf.
///
/// Wraps a sink connection and encodes each [`Measurement`] as one line of
/// InfluxDB line protocol. Clones share the same connection; writes are
/// serialized so lines never interleave.
#[derive(Clone, Debug)]
pub struct Publisher {
    endpoint: SinkEndpoint,
    connection: Arc<Mutex<SinkConnection>>,
}

impl Publisher {
    /// Connect to the configured sink.
    pub async fn connect(config: &SinkConfig) -> Result<Self> {
        let endpoint = config
            .endpoint()
            .map_err(|e| BridgeError::validation(e.to_string()))?;

        let connection = tsmetrics_common::connect(&endpoint)
            .await
            .map_err(|e| BridgeError::SinkConnection(e.to_string()))?;

        Ok(Self::new(endpoint, connection))
    }

    /// Create a publisher over an established connection.
    pub fn new(endpoint: SinkEndpoint, connection: SinkConnection) -> Self {
        Self {
            endpoint,
            connection: Arc::new(Mutex::new(connection)),
        }
    }

    /// Get the sink endpoint.
    pub fn endpoint(&self) -> &SinkEndpoint {
        &self.endpoint
    }

    /// Publish a measurement.
    pub async fn publish(&self, measurement: &Measurement) -> Result<()> {
        let line = encode(measurement).map_err(|e| BridgeError::Encoding(e.to_string()))?;

        let mut connection = self.connection.lock().await;
        connection
            .send(line.as_bytes())
            .await
            .map_err(|e| BridgeError::Publish {
                endpoint: self.endpoint.to_string(),
                measurement: measurement.name.clone(),
                message: e.to_string(),
            })?;

        tracing::trace!(endpoint = %self.endpoint, line = line.trim_end(), "Published measurement");

        Ok(())
    }
}

#[async_trait]
impl MeasurementSink for Publisher {
    async fn write(&self, measurement: &Measurement) -> Result<()> {
        self.publish(measurement).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UdpSocket;

    async fn udp_publisher() -> (Publisher, UdpSocket) {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = SinkConfig {
            url: format!("udp:{}", receiver.local_addr().unwrap()),
        };
        (Publisher::connect(&config).await.unwrap(), receiver)
    }

    #[tokio::test]
    async fn test_publish_over_udp() {
        let (publisher, receiver) = udp_publisher().await;
        let measurement = Measurement::new("teamspeak_server")
            .with_tag("port", "9987")
            .with_field("online", true);

        tokio_test::assert_ok!(publisher.publish(&measurement).await);

        let mut buf = [0u8; 256];
        let len = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"teamspeak_server,port=9987 online=true\n");
        assert_eq!(publisher.endpoint().scheme(), "udp");
    }

    #[tokio::test]
    async fn test_clones_share_connection() {
        let (publisher, receiver) = udp_publisher().await;
        let clone = publisher.clone();

        publisher
            .write(&Measurement::new("a").with_field("x", 1u64))
            .await
            .unwrap();
        clone
            .write(&Measurement::new("b").with_field("x", 2u64))
            .await
            .unwrap();

        let mut buf = [0u8; 64];
        let len = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"a x=1u\n");
        let len = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"b x=2u\n");
    }

    #[tokio::test]
    async fn test_unencodable_measurement() {
        let (publisher, _receiver) = udp_publisher().await;
        let result = publisher.publish(&Measurement::new("empty")).await;
        assert!(matches!(result, Err(BridgeError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_connect_invalid_url() {
        let config = SinkConfig {
            url: "carrier-pigeon:home".to_string(),
        };
        assert!(matches!(
            Publisher::connect(&config).await,
            Err(BridgeError::ConfigValidation(_))
        ));
    }
}
