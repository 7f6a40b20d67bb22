//! # Correlation Table & Waiting Protocol
//!
//! Tracks outstanding requests awaiting a response. A caller suspends in
//! [`WaiterHandle::wait`] (never the dispatch worker) until a matching
//! response arrives, the deadline passes, or the connection is torn down.
//!
//! ## At-most-once resolution
//!
//! Each waiter owns a oneshot channel. Removing the entry from the map is the
//! single linearization point: whichever of {[`resolve`], deadline expiry,
//! [`cancel_all`]} removes the entry first delivers the outcome; later events
//! for the same id find nothing and are no-ops.
//!
//! Completion signals are delivered after the map lock is released; the
//! critical sections are entry insertion/removal only.
//!
//! [`resolve`]: CorrelationTable::resolve
//! [`cancel_all`]: CorrelationTable::cancel_all

use crate::metrics::MessagingMetrics;
use parking_lot::Mutex;
use shared_types::{CorrelationId, MessageEnvelope, MessagingError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

/// The outcome delivered to a suspended caller.
type WaiterOutcome = Result<MessageEnvelope, MessagingError>;

/// One outstanding request: completion signal plus absolute deadline.
struct Waiter {
    tx: oneshot::Sender<WaiterOutcome>,
    deadline: Instant,
    timeout: Duration,
}

type WaiterMap = Arc<Mutex<HashMap<CorrelationId, Waiter>>>;

/// Mapping `correlation id → waiter`, guarded by an exclusive-access section.
pub struct CorrelationTable {
    waiters: WaiterMap,
    metrics: Arc<MessagingMetrics>,
}

impl CorrelationTable {
    #[must_use]
    pub fn new(metrics: Arc<MessagingMetrics>) -> Self {
        Self {
            waiters: Arc::new(Mutex::new(HashMap::new())),
            metrics,
        }
    }

    /// Atomically insert a new waiter with `deadline = now + timeout`.
    ///
    /// # Errors
    ///
    /// [`MessagingError::DuplicateCorrelation`] if a live waiter already
    /// holds this id.
    pub fn register_waiter(
        &self,
        id: CorrelationId,
        timeout: Duration,
    ) -> Result<WaiterHandle, MessagingError> {
        let deadline = Instant::now() + timeout;
        let (tx, rx) = oneshot::channel();

        {
            let mut waiters = self.waiters.lock();
            if waiters.contains_key(&id) {
                return Err(MessagingError::DuplicateCorrelation {
                    id: id.to_string(),
                });
            }
            waiters.insert(
                id.clone(),
                Waiter {
                    tx,
                    deadline,
                    timeout,
                },
            );
        }

        Ok(WaiterHandle {
            id,
            deadline,
            timeout,
            rx,
            waiters: Arc::clone(&self.waiters),
            metrics: Arc::clone(&self.metrics),
        })
    }

    /// Deliver a response to the waiter for `id`, removing it.
    ///
    /// Returns `None` when a waiter consumed the resolution. An absent id
    /// logs a warning and hands the envelope back: a dropped response is not
    /// fatal, and the caller decides what to do with the orphan. A response
    /// arriving past the waiter's deadline resolves it with
    /// [`MessagingError::Timeout`] instead of the stale result.
    pub fn resolve(
        &self,
        id: &CorrelationId,
        response: MessageEnvelope,
    ) -> Option<MessageEnvelope> {
        let Some(waiter) = self.waiters.lock().remove(id) else {
            warn!(correlation_id = %id, "Unknown correlation id: response has no waiter");
            self.metrics.record_unknown_correlation();
            return Some(response);
        };

        if waiter.deadline <= Instant::now() {
            warn!(correlation_id = %id, "Response arrived past deadline, resolving as timeout");
            self.metrics.record_timed_out();
            let _ = waiter.tx.send(Err(MessagingError::Timeout {
                timeout: waiter.timeout,
            }));
            return None;
        }

        self.metrics.record_resolved();
        if waiter.tx.send(Ok(response)).is_err() {
            // Caller abandoned the wait between removal and delivery.
            debug!(correlation_id = %id, "Waiter gone before delivery");
        }
        None
    }

    /// Atomically resolve every outstanding waiter with
    /// [`MessagingError::ConnectionClosed`] and empty the table.
    ///
    /// Safe to race with concurrent `register_waiter`/`resolve` calls: every
    /// waiter present at call time is resolved exactly once. Returns the
    /// number of waiters cancelled.
    pub fn cancel_all(&self, reason: &str) -> usize {
        let drained: Vec<(CorrelationId, Waiter)> =
            self.waiters.lock().drain().collect();
        let count = drained.len();

        for (id, waiter) in drained {
            debug!(correlation_id = %id, reason, "Waiter cancelled");
            let _ = waiter.tx.send(Err(MessagingError::closed(reason)));
        }
        if count > 0 {
            self.metrics.record_cancelled(count as u64);
            debug!(cancelled = count, reason, "Correlation table emptied");
        }
        count
    }

    /// Resolve every waiter whose deadline is at or before `now` with
    /// [`MessagingError::Timeout`]. Returns the number reaped.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let expired: Vec<(CorrelationId, Waiter)> = {
            let mut waiters = self.waiters.lock();
            let ids: Vec<CorrelationId> = waiters
                .iter()
                .filter(|(_, w)| w.deadline <= now)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| waiters.remove(&id).map(|w| (id, w)))
                .collect()
        };

        let count = expired.len();
        for (id, waiter) in expired {
            debug!(correlation_id = %id, "Waiter expired");
            self.metrics.record_timed_out();
            let _ = waiter.tx.send(Err(MessagingError::Timeout {
                timeout: waiter.timeout,
            }));
        }
        count
    }

    /// Remove a waiter without delivering anything.
    ///
    /// Used by a caller that already knows the outcome (local deadline hit,
    /// or transport send failure before the wait began).
    pub(crate) fn discard(&self, id: &CorrelationId) -> bool {
        self.waiters.lock().remove(id).is_some()
    }

    /// Number of outstanding waiters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waiters.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waiters.lock().is_empty()
    }
}

/// Handle held by the requesting caller while its response is outstanding.
///
/// Consumed by [`wait`](WaiterHandle::wait); dropping it without waiting
/// leaves the entry for the expiry reaper.
pub struct WaiterHandle {
    id: CorrelationId,
    deadline: Instant,
    timeout: Duration,
    rx: oneshot::Receiver<WaiterOutcome>,
    waiters: WaiterMap,
    metrics: Arc<MessagingMetrics>,
}

impl WaiterHandle {
    /// The correlation id this handle is waiting on.
    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.id
    }

    /// Suspend the calling task until resolution, deadline, or cancellation.
    ///
    /// Returns exactly once. On deadline expiry the handle removes its own
    /// table entry, so timeout latency never depends on the reaper's sweep
    /// interval.
    pub async fn wait(self) -> Result<MessageEnvelope, MessagingError> {
        match tokio::time::timeout_at(self.deadline, self.rx).await {
            Ok(Ok(outcome)) => outcome,
            // Table dropped wholesale without cancel_all; treat as teardown.
            Ok(Err(_)) => Err(MessagingError::closed("correlation engine dropped")),
            Err(_elapsed) => {
                if self.waiters.lock().remove(&self.id).is_some() {
                    self.metrics.record_timed_out();
                }
                // If discard lost the race, a resolution landed at the
                // deadline boundary; past the deadline it is still a timeout.
                Err(MessagingError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }
}
