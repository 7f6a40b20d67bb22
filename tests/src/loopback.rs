//! # Loopback Peer Fixture
//!
//! An in-memory [`MessageTransport`] standing in for a remote peer. Outbound
//! envelopes are recorded; requests with a paired response type
//! (`SyncRequest` → `SyncResponse`, `Ping` → `Pong`) are answered back into
//! the connected [`MessageSink`] after an optional delay.

use async_trait::async_trait;
use parking_lot::Mutex;
use peerlink_messaging::{MessageSink, MessageTransport};
use shared_types::{MessageEnvelope, MessagingError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory remote peer: records outbound traffic, echoes responses.
pub struct LoopbackPeer {
    node_id: String,
    sink: Mutex<Option<Arc<dyn MessageSink>>>,
    responding: AtomicBool,
    response_delay: Mutex<Duration>,
    /// Every envelope the engine handed to the transport, in send order.
    pub sent: Mutex<Vec<(String, MessageEnvelope)>>,
}

impl LoopbackPeer {
    #[must_use]
    pub fn new(node_id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            node_id: node_id.into(),
            sink: Mutex::new(None),
            responding: AtomicBool::new(true),
            response_delay: Mutex::new(Duration::ZERO),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Wire the peer back to the engine's inbound side.
    pub fn connect(&self, sink: Arc<dyn MessageSink>) {
        *self.sink.lock() = Some(sink);
    }

    /// Toggle whether requests get answered (off = simulate a dead peer).
    pub fn set_responding(&self, responding: bool) {
        self.responding.store(responding, Ordering::SeqCst);
    }

    /// Delay applied before each response is delivered.
    pub fn set_response_delay(&self, delay: Duration) {
        *self.response_delay.lock() = delay;
    }

    /// Deliver an unsolicited envelope from this peer into the engine.
    pub fn push_inbound(&self, envelope: MessageEnvelope) {
        if let Some(sink) = self.sink.lock().clone() {
            sink.handle_inbound(envelope);
        }
    }

    fn respond(&self, request: &MessageEnvelope) {
        if !self.responding.load(Ordering::SeqCst) {
            return;
        }
        if request.message_type.response_type().is_none() || !request.is_correlated() {
            return;
        }
        let Some(sink) = self.sink.lock().clone() else {
            return;
        };

        let mut payload = b"ack:".to_vec();
        payload.extend_from_slice(&request.payload);
        let response = MessageEnvelope::response_to(request, payload, self.node_id.clone());

        let delay = *self.response_delay.lock();
        tokio::spawn(async move {
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            sink.handle_inbound(response);
        });
    }
}

#[async_trait]
impl MessageTransport for LoopbackPeer {
    async fn send(
        &self,
        destination: &str,
        envelope: MessageEnvelope,
    ) -> Result<(), MessagingError> {
        self.sent
            .lock()
            .push((destination.to_string(), envelope.clone()));
        self.respond(&envelope);
        Ok(())
    }
}
