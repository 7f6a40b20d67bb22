//! # Messaging Metrics
//!
//! Lock-free counters for monitoring one engine instance. Reads are
//! `Relaxed` snapshots; exact cross-counter consistency is not a goal.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the queue, worker, and correlation table.
#[derive(Debug, Default)]
pub struct MessagingMetrics {
    /// Envelopes processed by the dispatch worker.
    dispatched: AtomicU64,
    /// Waiters resolved by a matching response.
    resolved: AtomicU64,
    /// Responses that arrived with no matching waiter.
    unknown_correlations: AtomicU64,
    /// Waiters resolved by deadline expiry.
    timed_out: AtomicU64,
    /// Waiters resolved by `cancel_all`.
    cancelled: AtomicU64,
    /// Message-callback failures forwarded to the error callback.
    handler_errors: AtomicU64,
}

impl MessagingMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_resolved(&self) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unknown_correlation(&self) {
        self.unknown_correlations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self, count: u64) {
        self.cancelled.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_handler_error(&self) {
        self.handler_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            unknown_correlations: self.unknown_correlations.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            handler_errors: self.handler_errors.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the engine counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub dispatched: u64,
    pub resolved: u64,
    pub unknown_correlations: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    pub handler_errors: u64,
}
