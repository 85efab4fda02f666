//! Prometheus metrics definitions for sensors-exporter.
//!
//! `SensorMetrics` owns its own `Registry` and is shared between the ingestion
//! task (sole writer) and the `/metrics` handler (concurrent readers). Every
//! collector stores its value atomically, so a scrape never observes a torn
//! gauge update. There is no eviction: a sensor that goes quiet keeps
//! exporting its last value until the process restarts.

use prometheus::{Encoder, GaugeVec, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use tracing::warn;

use crate::sensors::{fahrenheit_to_celsius, relative_humidity, LabelSet, Sample, LABEL_NAMES};

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 16 * 1024;

/// Collection of Prometheus metrics exported by the collector.
#[derive(Clone)]
pub struct SensorMetrics {
    registry: Registry,

    // ========== Per-sensor gauges ==========
    pub temperature_celsius: GaugeVec, // labels: id, device, model
    pub relative_humidity_percent: GaugeVec, // labels: id, device, model

    // ========== Link counters ==========
    pub samples_received: IntCounter,
    pub bytes_received: IntCounter,
    pub connection_attempts: IntCounter,
    pub connection_errors: IntCounter,
    pub parse_errors: IntCounter,

    // ========== Session state ==========
    pub connected: IntGauge,
    pub connection_number: IntGauge,
    pub session_devices: IntGauge,
}

impl SensorMetrics {
    /// Creates all collectors and registers them with a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let temperature_celsius = GaugeVec::new(
            Opts::new(
                "sensors_temperature_degrees_celsius",
                "Temperature sampled from a single sensor, in degrees celsius",
            ),
            &LABEL_NAMES,
        )?;
        let relative_humidity_percent = GaugeVec::new(
            Opts::new(
                "sensors_relative_humidity_percent",
                "Relative humidity sampled from a single sensor, in percent",
            ),
            &LABEL_NAMES,
        )?;

        let samples_received = IntCounter::new(
            "sensors_samples_received",
            "Samples received by collector",
        )?;
        let bytes_received = IntCounter::new(
            "sensors_bytes_received",
            "Bytes received by collector (not necessarily in samples)",
        )?;
        let connection_attempts = IntCounter::new(
            "sensors_connection_attempts",
            "Attempts to connect to the sensor bridge",
        )?;
        let connection_errors = IntCounter::new(
            "sensors_connection_errors",
            "Failures to connect to the sensor bridge",
        )?;
        let parse_errors = IntCounter::new(
            "sensors_parse_errors",
            "Sample fields dropped because their value could not be parsed",
        )?;

        let connected = IntGauge::new(
            "sensors_connected",
            "Whether a session with the sensor bridge is open (1) or not (0)",
        )?;
        let connection_number = IntGauge::new(
            "sensors_connection_number",
            "Sequence number of the current or most recent session",
        )?;
        let session_devices = IntGauge::new(
            "sensors_session_devices",
            "Distinct devices seen in the current session",
        )?;

        registry.register(Box::new(temperature_celsius.clone()))?;
        registry.register(Box::new(relative_humidity_percent.clone()))?;
        registry.register(Box::new(samples_received.clone()))?;
        registry.register(Box::new(bytes_received.clone()))?;
        registry.register(Box::new(connection_attempts.clone()))?;
        registry.register(Box::new(connection_errors.clone()))?;
        registry.register(Box::new(parse_errors.clone()))?;
        registry.register(Box::new(connected.clone()))?;
        registry.register(Box::new(connection_number.clone()))?;
        registry.register(Box::new(session_devices.clone()))?;

        Ok(Self {
            registry,
            temperature_celsius,
            relative_humidity_percent,
            samples_received,
            bytes_received,
            connection_attempts,
            connection_errors,
            parse_errors,
            connected,
            connection_number,
            session_devices,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Writes a classified sample into the gauges.
    ///
    /// Each numeric field is converted independently; a field that fails to
    /// parse is logged, counted and skipped without touching its gauge.
    /// Returns the number of fields dropped.
    pub fn record(&self, sample: &Sample<'_>) -> usize {
        let labels = LabelSet::for_sample(sample);
        let values = labels.values();
        let mut dropped = 0;

        match sample {
            Sample::Temperature { fahrenheit, .. } => match fahrenheit_to_celsius(fahrenheit) {
                Ok(celsius) => self.temperature_celsius.with_label_values(&values).set(celsius),
                Err(e) => {
                    warn!("Error parsing temperature from device {:?}: {}", labels.id, e);
                    dropped += 1;
                }
            },
            Sample::Humidity {
                humidity,
                fahrenheit,
                ..
            } => {
                match relative_humidity(humidity) {
                    Ok(percent) => self
                        .relative_humidity_percent
                        .with_label_values(&values)
                        .set(percent),
                    Err(e) => {
                        warn!("Error parsing humidity from device {:?}: {}", labels.id, e);
                        dropped += 1;
                    }
                }
                match fahrenheit_to_celsius(fahrenheit) {
                    Ok(celsius) => self.temperature_celsius.with_label_values(&values).set(celsius),
                    Err(e) => {
                        warn!("Error parsing temperature from device {:?}: {}", labels.id, e);
                        dropped += 1;
                    }
                }
            }
        }

        self.parse_errors.inc_by(dropped as u64);
        dropped
    }

    /// Encodes all families in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let families = self.registry.gather();
        let mut buffer = Vec::with_capacity(BUFFER_CAP);
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
