//! # Frey Metrics
//!
//! Client-side counters and logging setup for the frey stub resolver.
//!
//! ## Features
//!
//! - **Counters**: queries, cache outcomes, transport attempts and failures,
//!   published through the [`metrics`] facade
//! - **Snapshots**: process-local totals readable without an exporter
//! - **Structured logging**: text and JSON formats via [`tracing_setup`]

use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub mod tracing_setup;

/// Global metrics instance.
static METRICS: OnceCell<ClientMetrics> = OnceCell::new();

/// Gets or initializes the global metrics instance.
pub fn metrics() -> &'static ClientMetrics {
    METRICS.get_or_init(ClientMetrics::new)
}

/// Resolver client metrics.
///
/// Every recording method bumps a local atomic and emits the matching
/// `metrics` counter, so totals are available even when no recorder is
/// installed.
pub struct ClientMetrics {
    start_time: Instant,
    queries_total: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    udp_attempts: AtomicU64,
    tcp_fallbacks: AtomicU64,
    attempt_failures: AtomicU64,
    non_recursive_servers: AtomicU64,
    responses_total: AtomicU64,
    warning_responses: AtomicU64,
    timed_attempts: AtomicU64,
}

impl ClientMetrics {
    /// Creates a new metrics instance.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            queries_total: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            udp_attempts: AtomicU64::new(0),
            tcp_fallbacks: AtomicU64::new(0),
            attempt_failures: AtomicU64::new(0),
            non_recursive_servers: AtomicU64::new(0),
            responses_total: AtomicU64::new(0),
            warning_responses: AtomicU64::new(0),
            timed_attempts: AtomicU64::new(0),
        }
    }

    /// Returns the time since this instance was created.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    // =========================================================================
    // Query metrics
    // =========================================================================

    /// Records a top-level query.
    pub fn record_query(&self, qtype: &str) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);
        counter!("frey_queries_total", "type" => qtype.to_string()).increment(1);
    }

    /// Records an accepted response.
    ///
    /// `accepted` is false for response codes other than NOERROR and
    /// NXDOMAIN.
    pub fn record_response(&self, rcode: &str, accepted: bool) {
        self.responses_total.fetch_add(1, Ordering::Relaxed);
        if !accepted {
            self.warning_responses.fetch_add(1, Ordering::Relaxed);
        }
        counter!("frey_responses_total", "rcode" => rcode.to_string()).increment(1);
    }

    // =========================================================================
    // Cache metrics
    // =========================================================================

    /// Records a cache hit.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        counter!("frey_cache_hits_total").increment(1);
    }

    /// Records a cache miss, including expired entries.
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        counter!("frey_cache_misses_total").increment(1);
    }

    // =========================================================================
    // Transport metrics
    // =========================================================================

    /// Records a UDP attempt against `server`.
    pub fn record_udp_attempt(&self, server: SocketAddr) {
        self.udp_attempts.fetch_add(1, Ordering::Relaxed);
        counter!("frey_udp_attempts_total", "server" => server.to_string()).increment(1);
    }

    /// Records a fallback from UDP to TCP.
    pub fn record_tcp_fallback(&self, server: SocketAddr) {
        self.tcp_fallbacks.fetch_add(1, Ordering::Relaxed);
        counter!("frey_tcp_fallbacks_total", "server" => server.to_string()).increment(1);
    }

    /// Records a failed attempt against `server`.
    pub fn record_attempt_failure(&self, server: SocketAddr, error: &str) {
        self.attempt_failures.fetch_add(1, Ordering::Relaxed);
        counter!(
            "frey_attempt_failures_total",
            "server" => server.to_string(),
            "error" => error.to_string()
        )
        .increment(1);
    }

    /// Records a server newly found to lack recursion.
    pub fn record_non_recursive(&self, server: SocketAddr) {
        self.non_recursive_servers.fetch_add(1, Ordering::Relaxed);
        counter!("frey_non_recursive_servers_total", "server" => server.to_string()).increment(1);
    }

    /// Records how long one transport exchange took.
    pub fn record_attempt_latency(&self, transport: &str, duration: Duration) {
        self.timed_attempts.fetch_add(1, Ordering::Relaxed);
        histogram!("frey_attempt_duration_seconds", "transport" => transport.to_string())
            .record(duration.as_secs_f64());
    }

    /// Returns the current totals.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.uptime().as_secs(),
            queries_total: self.queries_total.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            udp_attempts: self.udp_attempts.load(Ordering::Relaxed),
            tcp_fallbacks: self.tcp_fallbacks.load(Ordering::Relaxed),
            attempt_failures: self.attempt_failures.load(Ordering::Relaxed),
            non_recursive_servers: self.non_recursive_servers.load(Ordering::Relaxed),
            responses_total: self.responses_total.load(Ordering::Relaxed),
            warning_responses: self.warning_responses.load(Ordering::Relaxed),
            timed_attempts: self.timed_attempts.load(Ordering::Relaxed),
        }
    }
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ClientMetrics`] totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub queries_total: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub udp_attempts: u64,
    pub tcp_fallbacks: u64,
    pub attempt_failures: u64,
    pub non_recursive_servers: u64,
    pub responses_total: u64,
    /// Responses delivered with a code other than NOERROR or NXDOMAIN.
    pub warning_responses: u64,
    /// Exchanges recorded in the latency histogram, timeouts included.
    pub timed_attempts: u64,
}

impl MetricsSnapshot {
    /// Fraction of queries answered from the cache.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

/// Attempt timing helper.
pub struct AttemptTimer {
    start: Instant,
    transport: &'static str,
}

impl AttemptTimer {
    /// Starts timing an exchange over `transport` ("udp" or "tcp").
    pub fn start(transport: &'static str) -> Self {
        Self {
            start: Instant::now(),
            transport,
        }
    }

    /// Returns the elapsed duration.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finishes timing and records the latency.
    pub fn finish(self) {
        metrics().record_attempt_latency(self.transport, self.elapsed());
    }
}
