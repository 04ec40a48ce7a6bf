//! Mapping of server records to `teamspeak_server` measurements.
//!
//! Field names and types are relied upon by existing dashboards; change them
//! only together with those.

use tsmetrics_common::Measurement;

use crate::record::RawServerRecord;

/// Measurement name written for every virtual server.
pub const MEASUREMENT: &str = "teamspeak_server";

/// Build the measurement for one virtual server.
///
/// Total: offline records from `serverlist` map to the same fields, with the
/// statistics they lack reported as zero.
pub fn to_measurement(server: &RawServerRecord) -> Measurement {
    Measurement::new(MEASUREMENT)
        .with_tag("port", server.port.to_string())
        .with_tag("id", server.id.to_string())
        .with_tag("name", server.name.clone())
        .with_field("port", server.port)
        .with_field("id", server.id as u16)
        .with_field("online", server.is_online())
        .with_field("v_clients", voice_clients(server))
        .with_field("q_clients", u64::from(server.query_clients_online))
        .with_field("m_clients", u64::from(server.max_clients))
        .with_field("autostart", server.autostart)
        .with_field("bytes_out", server.bytes_sent_total)
        .with_field("bytes_in", server.bytes_received_total)
        .with_field("channels", u64::from(server.channels_online))
        .with_field("reserved_slots", u64::from(server.reserved_slots))
        .with_field("uptime", server.uptime)
        .with_field("packets_in", server.packets_received_total)
        .with_field("packets_out", server.packets_sent_total)
        .with_field("ft_bytes_in_total", server.total_bytes_uploaded)
        .with_field("ft_bytes_out_total", server.total_bytes_downloaded)
        .with_field("pl_control", server.packet_loss_control)
        .with_field("pl_speech", server.packet_loss_speech)
        .with_field("pl_keepalive", server.packet_loss_keepalive)
        .with_field("pl_total", server.packet_loss_total)
        .with_field("bytes_out_speech", server.speech_bytes_sent)
        .with_field("bytes_in_speech", server.speech_bytes_received)
        .with_field("bytes_out_control", server.control_bytes_sent)
        .with_field("bytes_in_control", server.control_bytes_received)
        .with_field("bytes_out_keepalive", server.keepalive_bytes_sent)
        .with_field("bytes_in_keepalive", server.keepalive_bytes_received)
        .with_field("packets_out_speech", server.speech_packets_sent)
        .with_field("packets_in_speech", server.speech_packets_received)
        .with_field("packets_out_control", server.control_packets_sent)
        .with_field("packets_in_control", server.control_packets_received)
        .with_field("packets_keepalive_out", server.keepalive_packets_sent)
        .with_field("packets_keepalive_in", server.keepalive_packets_received)
        .with_field("avg_ping", server.total_ping)
}

/// Voice clients: connected clients minus query clients, never negative.
fn voice_clients(server: &RawServerRecord) -> u64 {
    u64::from(
        server
            .clients_online
            .saturating_sub(server.query_clients_online),
    )
}
