//! Canonical device labels.
//!
//! One-wire ids arrive as a two digit family code followed by the serial in
//! hex. The exported `device` label is `<model>-<serial>`, with the serial
//! zero-padded to 12 hex digits, so it stays stable no matter how the bridge
//! formats the id.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::DeviceIdError;

/// Model token of the humidity sensor. The bridge sends no id for it.
pub const HUMIDITY_MODEL: &str = "DHT22";

/// Label used for every humidity sensor. Only one is assumed to exist.
pub const HUMIDITY_DEVICE: &str = "dht22";

static ONE_WIRE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)[0-9a-f]{2}([0-9a-f]+)$").expect("valid device id regex"));

/// Extracts the serial number from a one-wire id.
///
/// Returns `None` when the id does not look like a one-wire id at all.
pub fn parse_serial(raw_id: &str) -> Option<Result<u64, DeviceIdError>> {
    let caps = ONE_WIRE_ID.captures(raw_id)?;
    let digits = &caps[1];
    Some(
        u64::from_str_radix(digits, 16).map_err(|source| DeviceIdError {
            digits: digits.to_string(),
            source,
        }),
    )
}

/// Maps a raw device id and model to the canonical device label.
pub fn resolve_device(raw_id: &str, model: &str) -> String {
    if model == HUMIDITY_MODEL {
        return HUMIDITY_DEVICE.to_string();
    }
    match parse_serial(raw_id) {
        Some(Ok(serial)) => format!("{}-{:012x}", model.to_lowercase(), serial),
        Some(Err(e)) => {
            warn!("{}, using raw id {:?}", e, raw_id);
            raw_id.to_string()
        }
        None => raw_id.to_string(),
    }
}
