//! # Dispatch Worker
//!
//! The single consumer of the inbound queue. Drains bounded batches and
//! routes each envelope: correlated responses resolve their waiter in the
//! correlation table, everything else goes to the registered message
//! callback. Handler failures are forwarded to the error callback and never
//! terminate the loop.

use crate::metrics::MessagingMetrics;
use crate::ports::inbound::{ErrorCallback, MessageCallback};
use crate::queue::InboundQueue;
use crate::table::CorrelationTable;
use parking_lot::RwLock;
use shared_types::{MessageEnvelope, MessagingError};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Registration slots for the message and error callbacks.
///
/// Slots may be (re)set at any time; the worker reads them per envelope
/// under a shared lock.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    message: RwLock<Option<MessageCallback>>,
    error: RwLock<Option<ErrorCallback>>,
}

impl CallbackRegistry {
    pub(crate) fn set_message_callback(&self, callback: MessageCallback) {
        *self.message.write() = Some(callback);
    }

    pub(crate) fn set_error_callback(&self, callback: ErrorCallback) {
        *self.error.write() = Some(callback);
    }

    fn message_callback(&self) -> Option<MessageCallback> {
        self.message.read().clone()
    }

    /// Surface an error nobody owns. Falls back to a log line so no failure
    /// path is silent.
    pub(crate) fn report_error(&self, error: &MessagingError) {
        let callback = self.error.read().clone();
        match callback {
            Some(callback) => callback(error),
            None => warn!(%error, "Messaging error with no error callback registered"),
        }
    }
}

/// Background loop routing inbound envelopes to resolution or callback.
pub(crate) struct DispatchWorker {
    queue: Arc<InboundQueue>,
    table: Arc<CorrelationTable>,
    callbacks: Arc<CallbackRegistry>,
    metrics: Arc<MessagingMetrics>,
    batch_size: usize,
}

impl DispatchWorker {
    pub(crate) fn new(
        queue: Arc<InboundQueue>,
        table: Arc<CorrelationTable>,
        callbacks: Arc<CallbackRegistry>,
        metrics: Arc<MessagingMetrics>,
        batch_size: usize,
    ) -> Self {
        Self {
            queue,
            table,
            callbacks,
            metrics,
            batch_size: batch_size.max(1),
        }
    }

    /// Spawn the worker task. Exits after the queue is closed and drained;
    /// join the handle before tearing down shared state.
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        debug!(batch_size = self.batch_size, "Dispatch worker started");
        while let Some(batch) = self.queue.recv_batch(self.batch_size).await {
            for envelope in batch {
                self.dispatch(envelope);
            }
        }
        debug!("Dispatch worker exited");
    }

    fn dispatch(&self, envelope: MessageEnvelope) {
        self.metrics.record_dispatched();

        // A correlated envelope with a live waiter resolves it; anything
        // else (no id, or id unknown) is an unsolicited message. resolve()
        // already logged and counted the unknown id.
        let envelope = match envelope.correlation_id.clone() {
            Some(id) => match self.table.resolve(&id, envelope) {
                None => return,
                Some(orphan) => orphan,
            },
            None => envelope,
        };

        self.handle_unsolicited(envelope);
    }

    fn handle_unsolicited(&self, envelope: MessageEnvelope) {
        let Some(callback) = self.callbacks.message_callback() else {
            debug!(
                message_type = %envelope.message_type,
                "No message callback registered, envelope dropped"
            );
            return;
        };

        if let Err(handler_error) = callback(envelope) {
            self.metrics.record_handler_error();
            self.callbacks
                .report_error(&MessagingError::Handler(handler_error));
        }
    }
}
