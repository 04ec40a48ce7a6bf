//! Telegraf bridge for TeamSpeak 3.
//!
//! This bridge logs into a TeamSpeak 3 ServerQuery interface, collects the
//! statistics of every virtual server on a fixed interval and writes them to
//! a Telegraf socket listener as InfluxDB line protocol.
//!
//! # Measurement
//!
//! ```text
//! teamspeak_server,id=<id>,name=<name>,port=<port> port=<port>u,id=<id>u,online=true,v_clients=4u,...
//! ```
//!
//! Where:
//! - `<id>` - Virtual server id
//! - `<port>` - Virtual server voice port
//! - `<name>` - Virtual server name (omitted when empty)

pub mod config;
pub mod enumerator;
pub mod error;
pub mod mapper;
pub mod poller;
pub mod query;
pub mod record;

pub use config::{Overrides, TeamspeakBridgeConfig, TeamspeakConfig};
pub use enumerator::list_servers;
pub use error::CollectError;
pub use mapper::to_measurement;
pub use poller::{PollerError, TeamspeakPoller};
pub use record::RawServerRecord;
