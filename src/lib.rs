//! Sensors Exporter Library
//!
//! This library ingests readings from a line-oriented sensor bridge and keeps
//! the latest value per sensor in a Prometheus registry. The HTTP surface
//! lives in the binary; everything here is independent of the web framework.
//!
//! # Features
//!
//! - **Reconnecting ingestion**: fixed-backoff reconnect loop that never exits
//! - **Line classification**: DS18x20 temperature and DHT22 humidity lines
//! - **Canonical labels**: device labels stable across reconnects
//! - **Injected registry**: `SensorMetrics` is owned, not global
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use sensors_exporter::{Dispatcher, LinkStatus, SensorMetrics, Session};
//!
//! let metrics = Arc::new(SensorMetrics::new().unwrap());
//! let dispatcher = Dispatcher::new(metrics.clone(), Arc::new(LinkStatus::new()));
//!
//! let mut session = Session::new(1);
//! dispatcher.dispatch_line(&mut session, b"123 temp 0428abcd1234 DS18B20 98.6");
//!
//! assert_eq!(metrics.samples_received.get(), 1);
//! ```

pub mod connection;
pub mod error;
pub mod health;
pub mod metrics;
pub mod sensors;

// Re-export main types for convenience
pub use connection::{ConnectionManager, Dispatcher, LineReader, LinkConfig, Session};
pub use error::{DeviceIdError, LinkError, ParseError};
pub use health::{LinkHealth, LinkStatus};
pub use metrics::SensorMetrics;
pub use sensors::{classify, LabelSet, Sample, SampleKind};
