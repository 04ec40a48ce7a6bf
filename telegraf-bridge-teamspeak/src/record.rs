//! Virtual server records as reported by `serverlist` and `serverinfo`.

use crate::query::{Properties, QueryError};

/// Status string of a running virtual server.
pub const STATUS_ONLINE: &str = "online";

/// Statistics for one virtual server.
///
/// `serverlist` only fills the identity, status and capacity fields;
/// `serverinfo` on a selected server fills everything. Missing properties
/// decode as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawServerRecord {
    pub id: u32,
    pub port: u16,
    pub name: String,
    pub status: String,
    pub autostart: bool,
    pub uptime: u64,

    pub clients_online: u32,
    pub query_clients_online: u32,
    pub max_clients: u32,
    pub reserved_slots: u32,
    pub channels_online: u32,

    pub bytes_sent_total: u64,
    pub bytes_received_total: u64,
    pub packets_sent_total: u64,
    pub packets_received_total: u64,

    pub speech_bytes_sent: u64,
    pub speech_bytes_received: u64,
    pub speech_packets_sent: u64,
    pub speech_packets_received: u64,

    pub control_bytes_sent: u64,
    pub control_bytes_received: u64,
    pub control_packets_sent: u64,
    pub control_packets_received: u64,

    pub keepalive_bytes_sent: u64,
    pub keepalive_bytes_received: u64,
    pub keepalive_packets_sent: u64,
    pub keepalive_packets_received: u64,

    /// File transfer bytes uploaded to the server.
    pub total_bytes_uploaded: i64,
    /// File transfer bytes downloaded from the server.
    pub total_bytes_downloaded: i64,

    pub packet_loss_speech: f64,
    pub packet_loss_keepalive: f64,
    pub packet_loss_control: f64,
    pub packet_loss_total: f64,

    /// Average client ping in milliseconds.
    pub total_ping: f32,
}

impl RawServerRecord {
    /// Whether the server is running (and can be selected).
    pub fn is_online(&self) -> bool {
        self.status == STATUS_ONLINE
    }

    /// Decode a `serverlist` or `serverinfo` record.
    pub fn from_properties(p: &Properties) -> Result<Self, QueryError> {
        Ok(Self {
            id: p.parse_or_default("virtualserver_id")?,
            port: p.parse_or_default("virtualserver_port")?,
            name: p.text("virtualserver_name"),
            status: p.text("virtualserver_status"),
            autostart: p.flag("virtualserver_autostart")?,
            uptime: p.parse_or_default("virtualserver_uptime")?,

            clients_online: p.parse_or_default("virtualserver_clientsonline")?,
            query_clients_online: p.parse_or_default("virtualserver_queryclientsonline")?,
            max_clients: p.parse_or_default("virtualserver_maxclients")?,
            reserved_slots: p.parse_or_default("virtualserver_reserved_slots")?,
            channels_online: p.parse_or_default("virtualserver_channelsonline")?,

            bytes_sent_total: p.parse_or_default("connection_bytes_sent_total")?,
            bytes_received_total: p.parse_or_default("connection_bytes_received_total")?,
            packets_sent_total: p.parse_or_default("connection_packets_sent_total")?,
            packets_received_total: p.parse_or_default("connection_packets_received_total")?,

            speech_bytes_sent: p.parse_or_default("connection_bytes_sent_speech")?,
            speech_bytes_received: p.parse_or_default("connection_bytes_received_speech")?,
            speech_packets_sent: p.parse_or_default("connection_packets_sent_speech")?,
            speech_packets_received: p.parse_or_default("connection_packets_received_speech")?,

            control_bytes_sent: p.parse_or_default("connection_bytes_sent_control")?,
            control_bytes_received: p.parse_or_default("connection_bytes_received_control")?,
            control_packets_sent: p.parse_or_default("connection_packets_sent_control")?,
            control_packets_received: p.parse_or_default("connection_packets_received_control")?,

            keepalive_bytes_sent: p.parse_or_default("connection_bytes_sent_keepalive")?,
            keepalive_bytes_received: p.parse_or_default("connection_bytes_received_keepalive")?,
            keepalive_packets_sent: p.parse_or_default("connection_packets_sent_keepalive")?,
            keepalive_packets_received: p
                .parse_or_default("connection_packets_received_keepalive")?,

            total_bytes_uploaded: p.parse_or_default("virtualserver_total_bytes_uploaded")?,
            total_bytes_downloaded: p.parse_or_default("virtualserver_total_bytes_downloaded")?,

            packet_loss_speech: p.parse_or_default("virtualserver_total_packetloss_speech")?,
            packet_loss_keepalive: p.parse_or_default("virtualserver_total_packetloss_keepalive")?,
            packet_loss_control: p.parse_or_default("virtualserver_total_packetloss_control")?,
            packet_loss_total: p.parse_or_default("virtualserver_total_packetloss_total")?,

            total_ping: p.parse_or_default("virtualserver_total_ping")?,
        })
    }
}
