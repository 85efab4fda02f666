//! Integration tests for line dispatch.
//!
//! These tests drive `Dispatcher` directly with bridge lines and check the
//! counters and gauges that end up in the registry.

use sensors_exporter::{Dispatcher, LinkStatus, SampleKind, SensorMetrics, Session};
use std::sync::Arc;

/// Helper to build a dispatcher with a fresh registry.
fn setup() -> (Arc<SensorMetrics>, Dispatcher) {
    let metrics = Arc::new(SensorMetrics::new().unwrap());
    let dispatcher = Dispatcher::new(metrics.clone(), Arc::new(LinkStatus::new()));
    (metrics, dispatcher)
}

#[test]
fn test_temperature_line_sets_gauge() {
    let (metrics, dispatcher) = setup();
    let mut session = Session::new(1);

    let kind = dispatcher.dispatch_line(&mut session, b"123 temp 0428abcd1234 DS18B20 98.6");

    assert_eq!(kind, Some(SampleKind::Temperature));
    assert_eq!(metrics.samples_received.get(), 1);
    let value = metrics
        .temperature_celsius
        .with_label_values(&["0428abcd1234", "ds18b20-0028abcd1234", "ds18b20"])
        .get();
    assert_eq!(value, 37.0);
}

#[test]
fn test_humidity_line_sets_both_gauges() {
    let (metrics, dispatcher) = setup();
    let mut session = Session::new(1);

    let kind = dispatcher.dispatch_line(&mut session, b"-5 humidity DHT22 45.2 77.0");

    assert_eq!(kind, Some(SampleKind::Humidity));
    let labels = ["dht22", "dht22", "dht22"];
    assert_eq!(
        metrics.relative_humidity_percent.with_label_values(&labels).get(),
        45.2
    );
    assert_eq!(metrics.temperature_celsius.with_label_values(&labels).get(), 25.0);
}

#[test]
fn test_garbage_is_ignored_but_counted_as_bytes() {
    let (metrics, dispatcher) = setup();
    let mut session = Session::new(1);

    assert_eq!(dispatcher.dispatch_line(&mut session, b"garbage line"), None);

    assert_eq!(metrics.samples_received.get(), 0);
    assert_eq!(metrics.bytes_received.get(), "garbage line".len() as u64 + 1);
    assert_eq!(session.devices_seen(), 0);
    let text = metrics.encode_text().unwrap();
    assert!(!text.contains("sensors_temperature_degrees_celsius{"));
}

#[test]
fn test_sample_counted_even_when_conversion_fails() {
    let (metrics, dispatcher) = setup();
    let mut session = Session::new(1);

    dispatcher.dispatch_line(&mut session, b"7 temp 28ff DS18B20 9.9.9");
    dispatcher.dispatch_line(&mut session, b"8 humidity DHT22 1..0 7.7.7");

    assert_eq!(metrics.samples_received.get(), 2);
    assert_eq!(metrics.parse_errors.get(), 3);
    let text = metrics.encode_text().unwrap();
    assert!(!text.contains("sensors_temperature_degrees_celsius{"));
    assert!(!text.contains("sensors_relative_humidity_percent{"));
}

#[test]
fn test_bytes_received_sums_all_lines() {
    let (metrics, dispatcher) = setup();
    let mut session = Session::new(1);
    let lines: [&[u8]; 4] = [
        b"1 temp 28ff DS18B20 70.1",
        b"",
        b"noise from the bridge",
        b"-2 humidity DHT22 40 70",
    ];

    for line in lines {
        dispatcher.dispatch_line(&mut session, line);
    }

    let expected: u64 = lines.iter().map(|l| l.len() as u64 + 1).sum();
    assert_eq!(metrics.bytes_received.get(), expected);
    assert_eq!(metrics.samples_received.get(), 2);
}

#[test]
fn test_first_seen_is_per_session() {
    let (metrics, dispatcher) = setup();

    let mut first = Session::new(1);
    dispatcher.dispatch_line(&mut first, b"1 temp 28ff DS18B20 70");
    dispatcher.dispatch_line(&mut first, b"2 temp 28ff DS18B20 71");
    assert_eq!(first.devices_seen(), 1);
    assert_eq!(metrics.session_devices.get(), 1);

    let mut second = Session::new(2);
    assert!(second.observe("28ff"), "device must be new again in a fresh session");
}

#[test]
fn test_label_set_stable_across_sessions() {
    let (metrics, dispatcher) = setup();
    let labels = ["28ff", "ds18b20-0000000000ff", "ds18b20"];

    dispatcher.dispatch_line(&mut Session::new(1), b"1 temp 28ff DS18B20 212");
    assert_eq!(metrics.temperature_celsius.with_label_values(&labels).get(), 100.0);

    dispatcher.dispatch_line(&mut Session::new(2), b"1 TEMP 28ff DS18B20 32");
    assert_eq!(metrics.temperature_celsius.with_label_values(&labels).get(), 0.0);
}
