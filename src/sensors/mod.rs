//! Sensor protocol handling.
//!
//! This module turns raw bridge lines into typed samples and derives the
//! label set each sample is exported under.

pub mod classifier;
pub mod device;
pub mod units;

pub use classifier::{classify, Sample, SampleKind};
pub use device::{resolve_device, HUMIDITY_DEVICE, HUMIDITY_MODEL};
pub use units::{fahrenheit_to_celsius, relative_humidity};

/// Label names shared by all per-sensor gauges, in `with_label_values` order.
pub const LABEL_NAMES: [&str; 3] = ["id", "device", "model"];

/// Identifies one exported series for a physical sensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelSet {
    pub id: String,
    pub device: String,
    pub model: String,
}

impl LabelSet {
    /// Derives the label set for a sample. Deterministic, so a sensor keeps
    /// its series across reconnects.
    pub fn for_sample(sample: &Sample<'_>) -> Self {
        match sample {
            Sample::Temperature {
                device_id, model, ..
            } => Self {
                id: device_id.to_string(),
                device: resolve_device(device_id, model),
                model: model.to_lowercase(),
            },
            Sample::Humidity { model, .. } => {
                let model = model.to_lowercase();
                Self {
                    id: model.clone(),
                    device: model.clone(),
                    model,
                }
            }
        }
    }

    pub fn values(&self) -> [&str; 3] {
        [&self.id, &self.device, &self.model]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_labels() {
        let sample = classify("123 temp 0428abcd1234 DS18B20 98.6").unwrap();
        let labels = LabelSet::for_sample(&sample);
        assert_eq!(labels.id, "0428abcd1234");
        assert_eq!(labels.device, "ds18b20-0028abcd1234");
        assert_eq!(labels.model, "ds18b20");
    }

    #[test]
    fn test_humidity_labels() {
        let sample = classify("-5 humidity DHT22 45.2 77.0").unwrap();
        let labels = LabelSet::for_sample(&sample);
        assert_eq!(labels.values(), ["dht22", "dht22", "dht22"]);
    }
}
