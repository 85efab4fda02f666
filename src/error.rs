//! Error types for sample parsing and the sensor link.
//!
//! None of these are fatal: parse errors drop a single field, link errors
//! end the current session and trigger a reconnect after the backoff.

use std::io;
use std::num::{ParseFloatError, ParseIntError};
use std::time::Duration;
use thiserror::Error;

/// A numeric field of a recognized sample could not be converted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("invalid decimal {text:?}: {source}")]
    InvalidDecimal {
        text: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("value {text:?} is out of range")]
    OutOfRange { text: String },
}

impl ParseError {
    /// The raw text that failed to convert.
    pub fn text(&self) -> &str {
        match self {
            ParseError::InvalidDecimal { text, .. } | ParseError::OutOfRange { text } => text,
        }
    }
}

/// The serial part of a device id did not fit into 64 bits.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("unparseable device serial {digits:?}: {source}")]
pub struct DeviceIdError {
    pub digits: String,
    #[source]
    pub source: ParseIntError,
}

/// Conditions that end a connection attempt or an established session.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("connection to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("read failed: {0}")]
    Read(#[from] io::Error),

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("stream closed by peer")]
    Closed,
}
