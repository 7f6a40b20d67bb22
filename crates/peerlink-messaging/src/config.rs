//! # Messaging Configuration
//!
//! Tuning knobs for one correlation engine instance.

use crate::{DEFAULT_DISPATCH_BATCH, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SWEEP_INTERVAL};
use std::time::Duration;

/// Configuration for a [`MessagingService`](crate::MessagingService).
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// Timeout applied when `request()` omits one.
    pub default_request_timeout: Duration,

    /// Interval between expiry-reaper sweeps.
    pub sweep_interval: Duration,

    /// Maximum envelopes drained from the inbound queue per batch.
    pub dispatch_batch_size: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            default_request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            dispatch_batch_size: DEFAULT_DISPATCH_BATCH,
        }
    }
}
