//! # Shared Types - Peerlink Message Model
//!
//! The data model shared between the correlation engine and its external
//! collaborators (transport adapters, upstream managers).
//!
//! ## Contents
//!
//! - [`MessageEnvelope`] / [`MessageType`]: the unit flowing through the system
//! - [`CorrelationId`]: opaque token linking a request to its response
//! - [`MessagingError`] / [`HandlerError`]: the error taxonomy
//!
//! Wire-format definition is deliberately absent: (de)serialization of
//! envelopes to raw bytes belongs to the transport adapter, not this crate.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod correlation;
pub mod envelope;
pub mod errors;

// Re-export main types
pub use correlation::CorrelationId;
pub use envelope::{MessageEnvelope, MessageType};
pub use errors::{HandlerError, MessagingError};
