//! Link health tracking for the sensor bridge connection.
//!
//! `LinkStatus` is updated by the ingestion task and read by the `/health`
//! endpoint. All fields are atomics or short critical sections, so readers
//! never block the read loop for long.
//!
//! # Usage
//!
//! ```rust
//! use sensors_exporter::LinkStatus;
//!
//! let status = LinkStatus::new();
//! status.mark_connected(1);
//! status.record_sample();
//!
//! let health = status.get_health();
//! assert!(health.connected);
//! assert_eq!(health.connection_number, 1);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

/// Point-in-time view of the link state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinkHealth {
    /// Whether a session is currently open.
    pub connected: bool,
    /// Number of the current or most recent session (0 = never connected).
    pub connection_number: u64,
    /// When the most recent session was established.
    pub last_connected: Option<DateTime<Utc>>,
    /// When the most recent recognized sample arrived.
    pub last_sample: Option<DateTime<Utc>>,
    /// Most recent link error, cleared on reconnect.
    pub last_error: Option<String>,
    /// "ok" when connected, "down" otherwise.
    pub status: String,
}

/// Thread-safe link state shared between the ingestion task and handlers.
#[derive(Default)]
pub struct LinkStatus {
    connected: AtomicBool,
    connection_number: AtomicU64,
    last_connected_unix: AtomicI64,
    last_sample_unix: AtomicI64,
    last_error: Mutex<Option<String>>,
}

fn unix_to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        None
    } else {
        DateTime::from_timestamp(secs, 0)
    }
}

impl LinkStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of session `number`.
    pub fn mark_connected(&self, number: u64) {
        self.connection_number.store(number, Ordering::Relaxed);
        self.last_connected_unix
            .store(Utc::now().timestamp(), Ordering::Relaxed);
        self.connected.store(true, Ordering::Relaxed);
        if let Ok(mut last_error) = self.last_error.lock() {
            *last_error = None;
        }
    }

    /// Records the end of the current session.
    pub fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Relaxed);
    }

    /// Remembers the most recent link error for display.
    pub fn record_error(&self, error: &dyn std::error::Error) {
        if let Ok(mut last_error) = self.last_error.lock() {
            *last_error = Some(error.to_string());
        }
    }

    pub fn record_sample(&self) {
        self.last_sample_unix
            .store(Utc::now().timestamp(), Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn connection_number(&self) -> u64 {
        self.connection_number.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of the current link state.
    pub fn get_health(&self) -> LinkHealth {
        let connected = self.is_connected();
        let last_error = self.last_error.lock().ok().and_then(|e| e.clone());

        LinkHealth {
            connected,
            connection_number: self.connection_number(),
            last_connected: unix_to_datetime(self.last_connected_unix.load(Ordering::Relaxed)),
            last_sample: unix_to_datetime(self.last_sample_unix.load(Ordering::Relaxed)),
            last_error,
            status: if connected { "ok" } else { "down" }.to_string(),
        }
    }
}
