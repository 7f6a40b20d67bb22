//! Outbound ports (SPI) for the correlation engine.

use async_trait::async_trait;
use shared_types::{MessageEnvelope, MessagingError};

/// Raw message transport implemented by network adapters.
///
/// The adapter owns serialization: the engine hands it an envelope and the
/// adapter turns it into wire bytes for `destination`. Wire format is
/// deliberately outside this crate.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Deliver an envelope to a peer.
    ///
    /// # Errors
    ///
    /// [`MessagingError::Transport`] when delivery fails; the engine maps
    /// this back to the requesting caller.
    async fn send(
        &self,
        destination: &str,
        envelope: MessageEnvelope,
    ) -> Result<(), MessagingError>;
}
