//! # Messaging Service
//!
//! The public surface consumed by upstream managers: `send`, `request`, and
//! callback registration, wired over a pluggable [`MessageTransport`].
//!
//! One service instance serves one connection/session. Construct it
//! explicitly and pass it by reference (or `Arc`) to consumers; there are no
//! global singletons.

use crate::config::MessagingConfig;
use crate::dispatch::{CallbackRegistry, DispatchWorker};
use crate::metrics::{MessagingMetrics, MetricsSnapshot};
use crate::ports::inbound::{ErrorCallback, MessageCallback, MessageSink};
use crate::ports::outbound::MessageTransport;
use crate::queue::InboundQueue;
use crate::reaper::ExpiryReaper;
use crate::table::CorrelationTable;
use parking_lot::Mutex;
use shared_types::{CorrelationId, MessageEnvelope, MessagingError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

/// Request/response correlation engine over a raw message transport.
///
/// ## Thread safety
///
/// The service is `Send + Sync`; share it across tasks via `Arc`. Any number
/// of callers may sit in [`request`](Self::request) concurrently; only those
/// callers suspend, never the dispatch worker.
pub struct MessagingService<T: MessageTransport> {
    config: MessagingConfig,
    transport: Arc<T>,
    queue: Arc<InboundQueue>,
    table: Arc<CorrelationTable>,
    callbacks: Arc<CallbackRegistry>,
    metrics: Arc<MessagingMetrics>,
    worker: Mutex<Option<JoinHandle<()>>>,
    reaper: Mutex<Option<JoinHandle<()>>>,
    reaper_stop: Arc<Notify>,
}

impl<T: MessageTransport> MessagingService<T> {
    /// Create the engine and start its dispatch worker and expiry reaper.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(config: MessagingConfig, transport: Arc<T>) -> Self {
        let metrics = Arc::new(MessagingMetrics::new());
        let queue = Arc::new(InboundQueue::new());
        let table = Arc::new(CorrelationTable::new(metrics.clone()));
        let callbacks = Arc::new(CallbackRegistry::default());
        let reaper_stop = Arc::new(Notify::new());

        let worker = DispatchWorker::new(
            queue.clone(),
            table.clone(),
            callbacks.clone(),
            metrics.clone(),
            config.dispatch_batch_size,
        )
        .spawn();
        let reaper =
            ExpiryReaper::new(table.clone(), config.sweep_interval, reaper_stop.clone()).spawn();

        Self {
            config,
            transport,
            queue,
            table,
            callbacks,
            metrics,
            worker: Mutex::new(Some(worker)),
            reaper: Mutex::new(Some(reaper)),
            reaper_stop,
        }
    }

    /// Fire-and-forget delivery of an envelope to a peer.
    ///
    /// # Errors
    ///
    /// Propagates the transport failure, if any.
    pub async fn send(
        &self,
        destination: &str,
        envelope: MessageEnvelope,
    ) -> Result<(), MessagingError> {
        self.transport.send(destination, envelope).await
    }

    /// Send a request and await its correlated response.
    ///
    /// Allocates a fresh correlation id (overwriting whatever the envelope
    /// carried), registers a waiter, delivers through the transport, and
    /// suspends until a matching response, the deadline, or teardown.
    /// `timeout = None` applies the configured default (30s out of the box).
    ///
    /// # Errors
    ///
    /// - [`MessagingError::Timeout`] if no response arrives in time.
    /// - [`MessagingError::ConnectionClosed`] on `cancel_all`/teardown.
    /// - [`MessagingError::Transport`] if delivery fails; the waiter is
    ///   unregistered before returning.
    /// - [`MessagingError::DuplicateCorrelation`] on an id collision.
    pub async fn request(
        &self,
        destination: &str,
        mut envelope: MessageEnvelope,
        timeout: Option<Duration>,
    ) -> Result<MessageEnvelope, MessagingError> {
        let timeout = timeout.unwrap_or(self.config.default_request_timeout);
        let id = CorrelationId::generate();
        envelope.correlation_id = Some(id.clone());

        let handle = self.table.register_waiter(id.clone(), timeout)?;
        debug!(
            correlation_id = %id,
            destination,
            message_type = %envelope.message_type,
            timeout = ?timeout,
            "Request registered"
        );

        if let Err(send_error) = self.transport.send(destination, envelope).await {
            // The request never left; nobody else can resolve this waiter.
            self.table.discard(&id);
            return Err(send_error);
        }

        handle.wait().await
    }

    /// Register the callback for unsolicited messages.
    pub fn set_message_callback(&self, callback: MessageCallback) {
        self.callbacks.set_message_callback(callback);
    }

    /// Register the callback for errors no single caller owns.
    pub fn set_error_callback(&self, callback: ErrorCallback) {
        self.callbacks.set_error_callback(callback);
    }

    /// Number of requests currently awaiting a response.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.table.len()
    }

    /// Current inbound queue depth.
    #[must_use]
    pub fn queued_inbound(&self) -> usize {
        self.queue.len()
    }

    /// Point-in-time engine counters.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Resolve every outstanding waiter with `ConnectionClosed(reason)`.
    ///
    /// Used on disconnect; the engine keeps running and new requests may be
    /// registered afterwards.
    pub fn cancel_all(&self, reason: &str) -> usize {
        self.table.cancel_all(reason)
    }

    /// Graceful teardown: stop the reaper, let the worker drain the inbound
    /// backlog and exit, then cancel every remaining waiter.
    ///
    /// Idempotent; later calls only repeat the (empty) cancel.
    pub async fn shutdown(&self) {
        self.reaper_stop.notify_one();
        self.queue.close();

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            let _ = worker.await;
        }
        let reaper = self.reaper.lock().take();
        if let Some(reaper) = reaper {
            let _ = reaper.await;
        }

        let cancelled = self.table.cancel_all("shutdown");
        debug!(cancelled, "Messaging service shut down");
    }
}

impl<T: MessageTransport> MessageSink for MessagingService<T> {
    /// Buffer an inbound envelope for the dispatch worker. Never blocks the
    /// transport callback.
    fn handle_inbound(&self, envelope: MessageEnvelope) {
        self.queue.enqueue(envelope);
    }
}
