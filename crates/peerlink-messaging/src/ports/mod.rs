//! Ports for the correlation engine.
//!
//! - [`inbound`]: surfaces the engine offers its collaborators (envelope
//!   ingestion, callback registration types).
//! - [`outbound`]: surfaces the engine requires from adapters (the message
//!   transport).

pub mod inbound;
pub mod outbound;
