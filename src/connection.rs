//! Connection manager for the sensor bridge.
//!
//! A single task owns the TCP session lifecycle:
//!
//! ```text
//! Disconnected -> Connecting -> Connected(reading) -> Disconnected -> ...
//! ```
//!
//! Every failure inherent to the remote link (refused, reset, timed out,
//! closed, overlong line) ends in a fixed backoff sleep and another attempt.
//! The loop has no terminal state.

use ahash::AHashSet as HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::LinkError;
use crate::health::LinkStatus;
use crate::metrics::SensorMetrics;
use crate::sensors::{classify, SampleKind};

pub const DEFAULT_CONNECT_ADDR: &str = "192.168.3.41:9456";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Settings for the sensor bridge link.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// `host:port` of the sensor bridge.
    pub address: String,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Fixed delay before every reconnect attempt.
    pub backoff: Duration,
    /// Longest accepted line, excluding the delimiter.
    pub max_line_bytes: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONNECT_ADDR.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

/// One connected period of the link.
#[derive(Debug)]
pub struct Session {
    number: u64,
    seen: HashSet<String>,
}

impl Session {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            seen: HashSet::new(),
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// Marks a device as seen. Returns true the first time in this session.
    pub fn observe(&mut self, device_id: &str) -> bool {
        if self.seen.contains(device_id) {
            return false;
        }
        self.seen.insert(device_id.to_string());
        true
    }

    pub fn devices_seen(&self) -> usize {
        self.seen.len()
    }
}

/// Newline-delimited reader with a bound on line length.
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    max_line_bytes: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R, max_line_bytes: usize) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::new(),
            max_line_bytes,
        }
    }

    /// Reads the next line without its `\n` (or `\r\n`).
    ///
    /// Returns `Ok(None)` at end of stream. A final line without a delimiter
    /// is still returned.
    pub async fn next_line(&mut self) -> Result<Option<&[u8]>, LinkError> {
        self.buf.clear();
        // Room for a full line plus `\r\n`
        let limit = self.max_line_bytes as u64 + 2;
        let n = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .await?;
        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        if self.buf.len() > self.max_line_bytes {
            return Err(LinkError::LineTooLong {
                limit: self.max_line_bytes,
            });
        }
        Ok(Some(&self.buf))
    }
}

/// Routes raw lines into the metric registry.
#[derive(Clone)]
pub struct Dispatcher {
    metrics: Arc<SensorMetrics>,
    status: Arc<LinkStatus>,
}

impl Dispatcher {
    pub fn new(metrics: Arc<SensorMetrics>, status: Arc<LinkStatus>) -> Self {
        Self { metrics, status }
    }

    /// Accounts for one line read from the bridge and records it if it is a
    /// recognized sample. Unrecognized lines only count towards bytes received.
    pub fn dispatch_line(&self, session: &mut Session, raw: &[u8]) -> Option<SampleKind> {
        self.metrics.bytes_received.inc_by(raw.len() as u64 + 1);

        let line = String::from_utf8_lossy(raw);
        let Some(sample) = classify(&line) else {
            debug!("Ignoring unrecognized line {:?}", line);
            return None;
        };

        self.metrics.samples_received.inc();
        self.status.record_sample();

        let source = sample.source_id();
        if session.observe(source) {
            info!(
                "Got first sample from {} in connection {}",
                source,
                session.number()
            );
            self.metrics
                .session_devices
                .set(session.devices_seen() as i64);
            if sample.kind() == SampleKind::Humidity {
                warn!(
                    "{} lines carry no device id; readings from several such sensors would share one series",
                    source
                );
            }
        }

        self.metrics.record(&sample);
        Some(sample.kind())
    }
}

/// Owns the reconnecting ingestion loop.
pub struct ConnectionManager {
    config: LinkConfig,
    dispatcher: Dispatcher,
    metrics: Arc<SensorMetrics>,
    status: Arc<LinkStatus>,
    connections: u64,
}

impl ConnectionManager {
    pub fn new(config: LinkConfig, metrics: Arc<SensorMetrics>, status: Arc<LinkStatus>) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(metrics.clone(), status.clone()),
            metrics,
            status,
            connections: 0,
        }
    }

    /// Runs the ingestion loop forever.
    pub async fn run(mut self) {
        info!(
            "Starting ingestion from {} (connect timeout {:?}, backoff {:?})",
            self.config.address, self.config.connect_timeout, self.config.backoff
        );

        loop {
            self.metrics.connection_attempts.inc();
            let stream = match self.connect().await {
                Ok(stream) => stream,
                Err(e) => {
                    self.metrics.connection_errors.inc();
                    warn!("Error connecting to {}: {}", self.config.address, e);
                    self.status.record_error(&e);
                    sleep(self.config.backoff).await;
                    continue;
                }
            };

            let mut session = self.open_session();
            let reason = self.read_session(stream, &mut session).await;
            self.close_session(&session, &reason);
            sleep(self.config.backoff).await;
        }
    }

    async fn connect(&self) -> Result<TcpStream, LinkError> {
        let addr = self.config.address.as_str();
        match timeout(self.config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(LinkError::Connect {
                addr: addr.to_string(),
                source,
            }),
            Err(_) => Err(LinkError::ConnectTimeout {
                addr: addr.to_string(),
                timeout: self.config.connect_timeout,
            }),
        }
    }

    /// Starts the next session. Connection numbers start at 1 and are never
    /// reused.
    pub fn open_session(&mut self) -> Session {
        self.connections += 1;
        let session = Session::new(self.connections);

        info!(
            "Connected to {} (connection {})",
            self.config.address,
            session.number()
        );
        self.metrics.connected.set(1);
        self.metrics.connection_number.set(session.number() as i64);
        self.metrics.session_devices.set(0);
        self.status.mark_connected(session.number());
        session
    }

    /// Reads lines until the transport fails or closes. The reader is
    /// dropped, closing the connection, before this returns.
    pub async fn read_session<R: AsyncRead + Unpin>(
        &self,
        reader: R,
        session: &mut Session,
    ) -> LinkError {
        let mut lines = LineReader::new(reader, self.config.max_line_bytes);
        loop {
            match lines.next_line().await {
                Ok(Some(raw)) => {
                    self.dispatcher.dispatch_line(session, raw);
                }
                Ok(None) => return LinkError::Closed,
                Err(e) => return e,
            }
        }
    }

    fn close_session(&self, session: &Session, reason: &LinkError) {
        match reason {
            LinkError::Closed => info!(
                "Connection {} to {} closed by peer",
                session.number(),
                self.config.address
            ),
            e => warn!(
                "Read failed from {} (connection {}): {}",
                self.config.address,
                session.number(),
                e
            ),
        }
        self.metrics.connected.set(0);
        self.status.mark_disconnected();
        self.status.record_error(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConnectionManager {
        let metrics = Arc::new(SensorMetrics::new().unwrap());
        ConnectionManager::new(LinkConfig::default(), metrics, Arc::new(LinkStatus::new()))
    }

    #[test]
    fn test_session_observe_once() {
        let mut session = Session::new(1);
        assert!(session.observe("28ff"));
        assert!(!session.observe("28ff"));
        assert!(session.observe("DHT22"));
        assert_eq!(session.devices_seen(), 2);
    }

    #[test]
    fn test_connection_numbers_are_sequential() {
        let mut manager = manager();
        assert_eq!(manager.open_session().number(), 1);
        assert_eq!(manager.open_session().number(), 2);
        assert_eq!(manager.metrics.connection_number.get(), 2);
    }

    #[tokio::test]
    async fn test_line_reader_strips_delimiters() {
        let data: &[u8] = b"one\r\ntwo\nthree";
        let mut reader = LineReader::new(data, 64);
        assert_eq!(reader.next_line().await.unwrap(), Some(&b"one"[..]));
        assert_eq!(reader.next_line().await.unwrap(), Some(&b"two"[..]));
        assert_eq!(reader.next_line().await.unwrap(), Some(&b"three"[..]));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_reader_bounds_length() {
        let data: &[u8] = b"12345678\n123456789\n";
        let mut reader = LineReader::new(data, 8);
        assert_eq!(reader.next_line().await.unwrap(), Some(&b"12345678"[..]));
        assert!(matches!(
            reader.next_line().await,
            Err(LinkError::LineTooLong { limit: 8 })
        ));
    }

    #[tokio::test]
    async fn test_line_reader_limit_excludes_crlf() {
        let data: &[u8] = b"12345678\r\n1234567\r\n123456789\r\n";
        let mut reader = LineReader::new(data, 8);
        assert_eq!(reader.next_line().await.unwrap(), Some(&b"12345678"[..]));
        assert_eq!(reader.next_line().await.unwrap(), Some(&b"1234567"[..]));
        assert!(matches!(
            reader.next_line().await,
            Err(LinkError::LineTooLong { limit: 8 })
        ));
    }

    #[tokio::test]
    async fn test_line_reader_rejects_unterminated_tail_over_limit() {
        let data: &[u8] = b"123456789";
        let mut reader = LineReader::new(data, 8);
        assert!(matches!(
            reader.next_line().await,
            Err(LinkError::LineTooLong { limit: 8 })
        ));
    }

    #[tokio::test]
    async fn test_read_session_counts_every_line() {
        let mut manager = manager();
        let mut session = manager.open_session();
        let data: &[u8] = b"noise\n1 temp 28ff DS18B20 32\n2 temp 28ff DS18B20 33\n";

        let reason = manager.read_session(data, &mut session).await;

        assert!(matches!(reason, LinkError::Closed));
        assert_eq!(manager.metrics.samples_received.get(), 2);
        assert_eq!(manager.metrics.bytes_received.get(), data.len() as u64);
        assert_eq!(session.devices_seen(), 1);
    }
}
