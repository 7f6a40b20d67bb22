//! # `MessageEnvelope`
//!
//! The universal container for all P2P messaging in Peerlink.
//!
//! ## Correlation
//!
//! Request/response flows use `correlation_id`:
//! - Requests carry a freshly generated id.
//! - Responses MUST echo the id from the original request.
//! - `correlation_id == None` means fire-and-forget.
//!
//! The payload is opaque bytes; what it means is the receiving manager's
//! business, never this layer's.

use crate::correlation::CorrelationId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Classification of a network message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// A full block announcement or delivery.
    Block,
    /// A single transaction.
    Transaction,
    /// A request for chain data (expects a `SyncResponse`).
    SyncRequest,
    /// The answer to a `SyncRequest`.
    SyncResponse,
    /// Liveness probe (expects a `Pong`).
    Ping,
    /// The answer to a `Ping`.
    Pong,
    /// A peer-reported error.
    Error,
}

impl MessageType {
    /// The response type paired with this request type, if any.
    #[must_use]
    pub fn response_type(self) -> Option<MessageType> {
        match self {
            Self::SyncRequest => Some(Self::SyncResponse),
            Self::Ping => Some(Self::Pong),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Block => "block",
            Self::Transaction => "transaction",
            Self::SyncRequest => "sync_request",
            Self::SyncResponse => "sync_response",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// The message container carrying type, payload, and routing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Classification used for routing on the receiving side.
    pub message_type: MessageType,

    /// Opaque payload bytes. Interpretation belongs to upstream managers.
    pub payload: Vec<u8>,

    /// Node id of the sender.
    pub sender: String,

    /// Unix timestamp (seconds since epoch) when the envelope was created.
    pub timestamp: u64,

    /// Correlation token for request/response pairing.
    /// `None` means fire-and-forget.
    pub correlation_id: Option<CorrelationId>,
}

impl MessageEnvelope {
    /// Create a fire-and-forget envelope stamped with the current time.
    #[must_use]
    pub fn new(message_type: MessageType, payload: Vec<u8>, sender: impl Into<String>) -> Self {
        Self {
            message_type,
            payload,
            sender: sender.into(),
            timestamp: unix_now(),
            correlation_id: None,
        }
    }

    /// Create a request envelope carrying the given correlation id.
    #[must_use]
    pub fn request(
        message_type: MessageType,
        payload: Vec<u8>,
        sender: impl Into<String>,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            ..Self::new(message_type, payload, sender)
        }
    }

    /// Create the response to a request envelope.
    ///
    /// Echoes the request's correlation id and flips the message type to its
    /// paired response type (`SyncRequest` → `SyncResponse`, `Ping` → `Pong`).
    /// Requests without a paired type respond as [`MessageType::Error`].
    #[must_use]
    pub fn response_to(request: &MessageEnvelope, payload: Vec<u8>, sender: impl Into<String>) -> Self {
        let message_type = request
            .message_type
            .response_type()
            .unwrap_or(MessageType::Error);
        Self {
            message_type,
            payload,
            sender: sender.into(),
            timestamp: unix_now(),
            correlation_id: request.correlation_id.clone(),
        }
    }

    /// Whether this envelope participates in a request/response exchange.
    #[must_use]
    pub fn is_correlated(&self) -> bool {
        self.correlation_id.is_some()
    }
}

/// Current unix time in seconds.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
