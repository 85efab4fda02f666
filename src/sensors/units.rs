//! Unit conversion for raw sample values.
//!
//! Both sensor families report temperatures in Fahrenheit; they are exported
//! in Celsius, rounded to 0.1 degrees since neither sensor is more precise
//! than about ±0.5°.

use crate::error::ParseError;

/// Parses a decimal field, rejecting non-finite values.
fn parse_decimal(text: &str) -> Result<f64, ParseError> {
    let value: f64 = text.parse().map_err(|source| ParseError::InvalidDecimal {
        text: text.to_string(),
        source,
    })?;
    if !value.is_finite() {
        return Err(ParseError::OutOfRange {
            text: text.to_string(),
        });
    }
    Ok(value)
}

/// Rounds a value expressed in tenths to whole tenths, halves away from zero.
fn round_tenths(tenths: f64) -> f64 {
    tenths.round() / 10.0
}

/// Converts a raw Fahrenheit reading to Celsius rounded to 0.1 degrees.
pub fn fahrenheit_to_celsius(text: &str) -> Result<f64, ParseError> {
    let fahrenheit = parse_decimal(text)?;
    Ok(round_tenths(10.0 * (fahrenheit - 32.0) * 5.0 / 9.0))
}

/// Parses a relative humidity reading in percent. No conversion is applied.
pub fn relative_humidity(text: &str) -> Result<f64, ParseError> {
    let value = parse_decimal(text)?;
    if value < 0.0 {
        return Err(ParseError::OutOfRange {
            text: text.to_string(),
        });
    }
    Ok(value)
}
