//! # Inbound Queue
//!
//! Thread-safe buffer decoupling transport callbacks (producers) from the
//! dispatch worker (the single consumer).
//!
//! The queue is **unbounded**: applying backpressure here would drop inbound
//! responses under burst and convert load into spurious request timeouts.
//! [`InboundQueue::len`] is exposed so depth can be observed instead.

use parking_lot::Mutex;
use shared_types::MessageEnvelope;
use std::collections::VecDeque;
use tokio::sync::Notify;
use tracing::{debug, warn};

struct QueueInner {
    buf: VecDeque<MessageEnvelope>,
    closed: bool,
}

/// Unbounded FIFO buffer between transport callbacks and the dispatch worker.
///
/// Producers never block; the consumer suspends in [`recv_batch`] until data
/// arrives or the queue is closed and drained. Single-consumer by contract:
/// the dispatch worker is the only caller of `recv_batch`.
///
/// [`recv_batch`]: InboundQueue::recv_batch
pub struct InboundQueue {
    inner: Mutex<QueueInner>,
    notify: Notify,
}

impl InboundQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                buf: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Append an envelope at the tail and wake the consumer.
    ///
    /// Never blocks the producer. Returns `false` if the queue is closed, in
    /// which case the envelope is dropped with a warning.
    pub fn enqueue(&self, envelope: MessageEnvelope) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                warn!(
                    message_type = %envelope.message_type,
                    sender = %envelope.sender,
                    "Inbound envelope dropped: queue closed"
                );
                return false;
            }
            inner.buf.push_back(envelope);
        }
        self.notify.notify_one();
        true
    }

    /// Pop up to `max` envelopes in one critical section, without suspending.
    ///
    /// The lock is not held while the batch is processed.
    #[must_use]
    pub fn dequeue_batch(&self, max: usize) -> Vec<MessageEnvelope> {
        let mut inner = self.inner.lock();
        let take = max.min(inner.buf.len());
        inner.buf.drain(..take).collect()
    }

    /// Suspend until envelopes are available, then drain up to `max`.
    ///
    /// Returns `None` only once the queue is closed **and** fully drained, so
    /// the consumer always finishes the backlog before exiting.
    pub async fn recv_batch(&self, max: usize) -> Option<Vec<MessageEnvelope>> {
        loop {
            {
                let inner = self.inner.lock();
                if !inner.buf.is_empty() {
                    drop(inner);
                    return Some(self.dequeue_batch(max));
                }
                if inner.closed {
                    return None;
                }
            }
            // notify_one stores a permit when no consumer is parked, so a
            // wakeup between the lock release and this await is not lost.
            self.notify.notified().await;
        }
    }

    /// Close the queue and wake the consumer so it can drain and exit.
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return;
            }
            inner.closed = true;
            debug!(backlog = inner.buf.len(), "Inbound queue closed");
        }
        self.notify.notify_one();
    }

    /// Current queue depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().buf.is_empty()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}
