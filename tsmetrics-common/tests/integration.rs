//! Integration tests for tsmetrics-common library.

use tokio::net::UdpSocket;
use tsmetrics_common::{FieldValue, Measurement, SinkConfig, SinkEndpoint, connect, encode};

#[test]
fn test_full_measurement_workflow() {
    let measurement = Measurement::new("teamspeak_server")
        .with_tag("port", "9987")
        .with_tag("id", "1")
        .with_tag("name", "Main Lobby")
        .with_field("online", true)
        .with_field("v_clients", 12u64)
        .with_field("avg_ping", 23.5f32);

    let line = encode(&measurement).expect("encode failed");

    assert!(line.starts_with("teamspeak_server,id=1,name=Main\\ Lobby,port=9987 "));
    assert!(line.contains("online=true"));
    assert!(line.contains("v_clients=12u"));
    assert!(line.contains("avg_ping=23.5"));
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);
}

#[test]
fn test_all_field_value_types() {
    let values = [
        (FieldValue::UInt16(u16::MAX), "v=65535u"),
        (FieldValue::UInt64(u64::MAX), "v=18446744073709551615u"),
        (FieldValue::Int64(i64::MIN), "v=-9223372036854775808i"),
        (FieldValue::Float32(0.5), "v=0.5"),
        (FieldValue::Float64(1.0), "v=1"),
        (FieldValue::Boolean(false), "v=false"),
        (FieldValue::Text("hello".to_string()), "v=\"hello\""),
    ];

    for (value, expected) in values {
        let line = encode(&Measurement::new("m").with_field("v", value)).unwrap();
        assert_eq!(line, format!("m {}\n", expected));
    }
}

#[test]
fn test_measurement_with_many_tags() {
    let mut measurement = Measurement::new("m").with_field("x", 1u64);
    for i in (0..20).rev() {
        measurement = measurement.with_tag(format!("key_{:02}", i), format!("value_{}", i));
    }

    let line = encode(&measurement).unwrap();
    let tag_section = line.split(' ').next().unwrap();
    let keys: Vec<&str> = tag_section
        .split(',')
        .skip(1)
        .map(|kv| kv.split('=').next().unwrap())
        .collect();

    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys.len(), 20);
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn test_configured_udp_sink_delivers_line() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = receiver.local_addr().unwrap();

    let sink = SinkConfig {
        url: format!("udp:{}", addr),
    };
    let endpoint = sink.endpoint().unwrap();
    assert!(matches!(endpoint, SinkEndpoint::Udp(_)));

    let mut connection = connect(&endpoint).await.unwrap();
    let line = encode(&Measurement::new("m").with_field("up", true)).unwrap();
    connection.send(line.as_bytes()).await.unwrap();

    let mut buf = [0u8; 128];
    let len = receiver.recv(&mut buf).await.unwrap();
    assert_eq!(&buf[..len], b"m up=true\n");
}
