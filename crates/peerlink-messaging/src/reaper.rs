//! # Expiry Reaper
//!
//! Push-based expiry: a dedicated low-frequency timer task sweeps the
//! correlation table on a fixed interval, independent of traffic.
//!
//! Callers waiting in [`WaiterHandle::wait`](crate::WaiterHandle::wait)
//! already observe their deadline precisely; the reaper is the safety net
//! that clears entries whose callers disappeared (handle dropped without
//! waiting), within one sweep interval of expiry.

use crate::table::CorrelationTable;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

/// Periodic sweeper for expired correlation-table entries.
pub(crate) struct ExpiryReaper {
    table: Arc<CorrelationTable>,
    sweep_interval: Duration,
    stop: Arc<Notify>,
}

impl ExpiryReaper {
    pub(crate) fn new(
        table: Arc<CorrelationTable>,
        sweep_interval: Duration,
        stop: Arc<Notify>,
    ) -> Self {
        Self {
            table,
            sweep_interval,
            stop,
        }
    }

    /// Spawn the sweep task; it runs until `stop` is notified.
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        debug!(sweep_interval = ?self.sweep_interval, "Expiry reaper started");
        let mut ticker = interval(self.sweep_interval);
        // The first tick fires immediately; harmless against an empty table.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.stop.notified() => break,
                _ = ticker.tick() => {
                    let reaped = self.table.sweep_expired(Instant::now());
                    if reaped > 0 {
                        debug!(reaped, "Expired waiters reaped");
                    }
                }
            }
        }
        debug!("Expiry reaper exited");
    }
}
