//! Line classification for the sensor bridge protocol.
//!
//! The bridge emits one reading per line:
//!
//! ```text
//! <seq> temp <hexid> <model> <fahrenheit>
//! <seq> humidity DHT22 <humidity> <fahrenheit>
//! ```
//!
//! Literal tokens match case-insensitively. Anything else on the wire is
//! protocol noise and is ignored.

use once_cell::sync::Lazy;
use regex::Regex;

static TEMPERATURE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)(-?[0-9]+) temp ([0-9a-f]+) (\w+) ([0-9.]+)$")
        .expect("valid temperature regex")
});

static HUMIDITY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)(-?[0-9]+) humidity (DHT22) ([0-9.]+) ([0-9.]+)$")
        .expect("valid humidity regex")
});

/// Kind of reading carried by a sample line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Temperature,
    Humidity,
}

/// A recognized but not yet converted reading, borrowing from its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sample<'a> {
    Temperature {
        sequence: &'a str,
        device_id: &'a str,
        model: &'a str,
        fahrenheit: &'a str,
    },
    Humidity {
        sequence: &'a str,
        model: &'a str,
        humidity: &'a str,
        fahrenheit: &'a str,
    },
}

impl<'a> Sample<'a> {
    pub fn kind(&self) -> SampleKind {
        match self {
            Sample::Temperature { .. } => SampleKind::Temperature,
            Sample::Humidity { .. } => SampleKind::Humidity,
        }
    }

    /// Sequence number or timestamp prefix emitted by the bridge.
    pub fn sequence(&self) -> &'a str {
        match self {
            Sample::Temperature { sequence, .. } | Sample::Humidity { sequence, .. } => *sequence,
        }
    }

    /// Identifier used for first-seen bookkeeping. Humidity lines carry no
    /// id, so their model token stands in for it.
    pub fn source_id(&self) -> &'a str {
        match self {
            Sample::Temperature { device_id, .. } => *device_id,
            Sample::Humidity { model, .. } => *model,
        }
    }
}

/// Matches a line (without its delimiter) against the known sample formats.
pub fn classify(line: &str) -> Option<Sample<'_>> {
    if let Some(caps) = TEMPERATURE_LINE.captures(line) {
        let (_, [sequence, device_id, model, fahrenheit]) = caps.extract();
        return Some(Sample::Temperature {
            sequence,
            device_id,
            model,
            fahrenheit,
        });
    }
    if let Some(caps) = HUMIDITY_LINE.captures(line) {
        let (_, [sequence, model, humidity, fahrenheit]) = caps.extract();
        return Some(Sample::Humidity {
            sequence,
            model,
            humidity,
            fahrenheit,
        });
    }
    None
}
