//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers. The ingestion task holds clones of the same
//! `Arc`s, so handlers always see the latest recorded values.

use sensors_exporter::{LinkStatus, SensorMetrics};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub metrics: Arc<SensorMetrics>,
    /// Link state written by the ingestion task.
    pub link_status: Arc<LinkStatus>,
    pub config: Arc<Config>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
