//! # Correlation IDs
//!
//! Opaque tokens that link a request envelope to its eventual response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token correlating a request/response pair.
///
/// A fixed-length (16 hex characters) token derived from a single 64-bit
/// random draw. Generation is non-blocking and deliberately
/// non-cryptographic: the only requirement is practical collision avoidance
/// within the correlation table's live window. The table rejects duplicate
/// registrations rather than overwriting, so a collision is observable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Length of the hex token in characters.
    pub const LEN: usize = 16;

    /// Generate a fresh correlation id from the thread-local RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{:016x}", rand::random::<u64>()))
    }

    /// Wrap an existing token (e.g., echoed back in a response).
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
