//! # Error Types
//!
//! The messaging error taxonomy shared between the engine and its callers.
//!
//! An unknown correlation id (response with no matching waiter) is NOT an
//! error value: dropped responses are non-fatal and surface only as a
//! warning log plus a metrics counter.

use crate::envelope::MessageType;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a registered message callback.
///
/// The engine never interprets the message; it forwards this to the
/// process-wide error callback and keeps dispatching.
#[derive(Debug, Clone, Error)]
#[error("handler failed for {message_type} message: {reason}")]
pub struct HandlerError {
    /// Type of the envelope the handler choked on.
    pub message_type: MessageType,
    /// Human-readable failure description.
    pub reason: String,
}

impl HandlerError {
    /// Create a handler error for the given envelope type.
    #[must_use]
    pub fn new(message_type: MessageType, reason: impl Into<String>) -> Self {
        Self {
            message_type,
            reason: reason.into(),
        }
    }
}

/// Errors produced by the correlation engine.
#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    /// Deadline elapsed with no matching response.
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// A waiter is already registered for this correlation id.
    #[error("duplicate correlation id: {id}")]
    DuplicateCorrelation { id: String },

    /// The connection was torn down while the request was outstanding.
    #[error("connection closed: {reason}")]
    ConnectionClosed { reason: String },

    /// The transport adapter failed to deliver the envelope.
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    /// A message callback reported failure.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl MessagingError {
    /// Shorthand for a transport failure.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Shorthand for a connection-closed resolution.
    #[must_use]
    pub fn closed(reason: impl Into<String>) -> Self {
        Self::ConnectionClosed {
            reason: reason.into(),
        }
    }
}
