//! # Peerlink Messaging - Request/Response Correlation Engine
//!
//! The asynchronous correlation layer between a raw message transport and
//! application-level callers. One instance serves one connection/session and
//! is passed by reference to its consumers; there are no global singletons.
//!
//! ## Flow
//!
//! ```text
//! transport bytes ──deserialize──→ MessageSink::handle_inbound
//!                                        │ enqueue
//!                                        ▼
//!                                 ┌──────────────┐
//!                                 │ InboundQueue │ (unbounded, FIFO)
//!                                 └──────────────┘
//!                                        │ recv_batch
//!                                        ▼
//!                                 DispatchWorker ──┬─→ CorrelationTable::resolve
//!                                                  └─→ message callback
//!
//! request() ──→ register_waiter ──→ transport.send ──→ WaiterHandle::wait
//!                                                       (response | timeout | cancel)
//! ```
//!
//! ## Resolution guarantee
//!
//! Removal from the correlation table is the single linearization point:
//! whichever of {matching response, deadline expiry, `cancel_all`} removes a
//! waiter's entry first wins, and every registered waiter resolves exactly
//! once.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod dispatch;
pub mod metrics;
pub mod ports;
pub mod queue;
pub mod reaper;
pub mod service;
pub mod table;

// Re-export main types
pub use config::MessagingConfig;
pub use metrics::{MessagingMetrics, MetricsSnapshot};
pub use ports::inbound::{ErrorCallback, MessageCallback, MessageSink};
pub use ports::outbound::MessageTransport;
pub use queue::InboundQueue;
pub use service::MessagingService;
pub use table::{CorrelationTable, WaiterHandle};

use std::time::Duration;

/// Timeout applied when `request()` is called without one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between expiry-reaper sweeps of the correlation table.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum envelopes the dispatch worker drains per critical section.
pub const DEFAULT_DISPATCH_BATCH: usize = 32;
