//! Inbound ports (API) for the correlation engine.

use shared_types::{HandlerError, MessageEnvelope, MessagingError};
use std::sync::Arc;

/// Entry point for envelopes arriving off the wire.
///
/// The transport adapter deserializes raw bytes into a [`MessageEnvelope`]
/// and hands it over here; this call never blocks the transport.
pub trait MessageSink: Send + Sync {
    /// Buffer an inbound envelope for dispatch.
    fn handle_inbound(&self, envelope: MessageEnvelope);
}

/// Callback invoked for every envelope that is not a correlated response.
///
/// Returning `Err` routes a [`HandlerError`] to the error callback; it never
/// stops the dispatch worker.
pub type MessageCallback = Arc<dyn Fn(MessageEnvelope) -> Result<(), HandlerError> + Send + Sync>;

/// Callback invoked for failures that no single caller owns
/// (handler errors, dropped envelopes).
pub type ErrorCallback = Arc<dyn Fn(&MessagingError) + Send + Sync>;
