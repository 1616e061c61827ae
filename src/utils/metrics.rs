//! Observability and Metrics
//!
//! Counters describing what a session sent, received, matched and dropped.
//!
//! Each [`Session`](crate::protocol::session::Session) owns its own
//! [`Metrics`]; there is no process-wide instance. Counters are atomics so a
//! shared reference is enough to record.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for one session
#[derive(Debug)]
pub struct Metrics {
    /// Requests transmitted (one per operation)
    pub requests_sent: AtomicU64,
    /// Datagrams transmitted
    pub datagrams_sent: AtomicU64,
    /// Datagrams received, decodable or not
    pub datagrams_received: AtomicU64,
    /// Total bytes sent
    pub bytes_sent: AtomicU64,
    /// Total bytes received
    pub bytes_received: AtomicU64,
    /// Datagrams too short to hold a header
    pub datagrams_discarded: AtomicU64,
    /// Decodable datagrams that answered nothing we asked
    pub datagrams_uncorrelated: AtomicU64,
    /// Requests answered by a correlated reply
    pub responses_matched: AtomicU64,
    /// Requests whose deadline passed unanswered
    pub timeouts: AtomicU64,
    /// Distinct units added to the discovery set
    pub units_discovered: AtomicU64,
    /// Correlated replies carrying a non-zero error code
    pub device_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_sent: AtomicU64::new(0),
            datagrams_sent: AtomicU64::new(0),
            datagrams_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            datagrams_discarded: AtomicU64::new(0),
            datagrams_uncorrelated: AtomicU64::new(0),
            responses_matched: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            units_discovered: AtomicU64::new(0),
            device_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request leaving the session
    pub fn request_sent(&self, byte_count: u64) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record an inbound datagram
    pub fn datagram_received(&self, byte_count: u64) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a datagram dropped before parsing
    pub fn datagram_discarded(&self) {
        self.datagrams_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a parsed datagram that matched no pending request
    pub fn datagram_uncorrelated(&self) {
        self.datagrams_uncorrelated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a correlated reply
    pub fn response_matched(&self) {
        self.responses_matched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an expired deadline
    pub fn timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a newly discovered unit
    pub fn unit_discovered(&self) {
        self.units_discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reply with a non-zero error code
    pub fn device_error(&self) {
        self.device_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            datagrams_sent: self.datagrams_sent.load(Ordering::Relaxed),
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            datagrams_discarded: self.datagrams_discarded.load(Ordering::Relaxed),
            datagrams_uncorrelated: self.datagrams_uncorrelated.load(Ordering::Relaxed),
            responses_matched: self.responses_matched.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            units_discovered: self.units_discovered.load(Ordering::Relaxed),
            device_errors: self.device_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            requests_sent = snapshot.requests_sent,
            datagrams_sent = snapshot.datagrams_sent,
            datagrams_received = snapshot.datagrams_received,
            bytes_sent = snapshot.bytes_sent,
            bytes_received = snapshot.bytes_received,
            datagrams_discarded = snapshot.datagrams_discarded,
            datagrams_uncorrelated = snapshot.datagrams_uncorrelated,
            responses_matched = snapshot.responses_matched,
            timeouts = snapshot.timeouts,
            units_discovered = snapshot.units_discovered,
            device_errors = snapshot.device_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Session metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_sent: u64,
    pub datagrams_sent: u64,
    pub datagrams_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub datagrams_discarded: u64,
    pub datagrams_uncorrelated: u64,
    pub responses_matched: u64,
    pub timeouts: u64,
    pub units_discovered: u64,
    pub device_errors: u64,
    pub uptime_seconds: u64,
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}
