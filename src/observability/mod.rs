//! Logging setup and request metrics.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Logs go to stderr because stdout carries the tool protocol. `RUST_LOG`
/// overrides the default level (`debug` when `debug` is set, else `info`).
pub fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Request counters for one API client.
#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    requests_success: AtomicU64,
    requests_failed: AtomicU64,
    requests_rate_limited: AtomicU64,
}

impl Metrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one logical request.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful request.
    pub fn record_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed request; rate-limit failures are counted separately too.
    pub fn record_failure(&self, rate_limited: bool) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        if rate_limited {
            self.requests_rate_limited.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Gets a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            requests_rate_limited: self.requests_rate_limited.load(Ordering::Relaxed),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Logical requests started.
    pub requests_total: u64,
    /// Requests that succeeded, possibly after retries.
    pub requests_success: u64,
    /// Requests that failed.
    pub requests_failed: u64,
    /// Failed requests whose final error was a rate limit.
    pub requests_rate_limited: u64,
}
