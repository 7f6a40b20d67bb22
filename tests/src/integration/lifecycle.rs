//! # Lifecycle Flows
//!
//! Timeouts against a silent peer, disconnect cancellation, handler-error
//! reporting, and graceful shutdown.

#[cfg(test)]
mod tests {
    use crate::init_tracing;
    use crate::loopback::LoopbackPeer;
    use parking_lot::Mutex;
    use peerlink_messaging::{MessagingConfig, MessagingService};
    use shared_types::{HandlerError, MessageEnvelope, MessageType, MessagingError};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::time::timeout;

    fn engine(
        peer: &Arc<LoopbackPeer>,
        config: MessagingConfig,
    ) -> Arc<MessagingService<LoopbackPeer>> {
        init_tracing();
        let service = Arc::new(MessagingService::new(config, peer.clone()));
        peer.connect(service.clone());
        service
    }

    #[tokio::test]
    async fn test_silent_peer_times_out_not_before_deadline() {
        let peer = LoopbackPeer::new("peer-2");
        peer.set_responding(false);
        let service = engine(&peer, MessagingConfig::default());

        let started = Instant::now();
        let result = service
            .request(
                "peer-2",
                MessageEnvelope::new(MessageType::SyncRequest, vec![], "peer-1"),
                Some(Duration::from_millis(50)),
            )
            .await;

        assert!(matches!(result, Err(MessagingError::Timeout { .. })));
        // Never before the deadline.
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(service.pending_requests(), 0);
        assert_eq!(service.metrics().timed_out, 1);
        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_late_response_after_timeout_is_orphaned() {
        let peer = LoopbackPeer::new("peer-2");
        peer.set_response_delay(Duration::from_millis(100));
        let service = engine(&peer, MessagingConfig::default());

        let result = service
            .request(
                "peer-2",
                MessageEnvelope::new(MessageType::SyncRequest, vec![], "peer-1"),
                Some(Duration::from_millis(20)),
            )
            .await;
        assert!(matches!(result, Err(MessagingError::Timeout { .. })));

        // Let the delayed response land; it finds no waiter.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(service.metrics().unknown_correlations, 1);
        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_disconnect_cancels_every_outstanding_request() {
        let peer = LoopbackPeer::new("peer-2");
        peer.set_responding(false);
        let service = engine(&peer, MessagingConfig::default());

        let mut callers = Vec::new();
        for _ in 0..2 {
            let service = service.clone();
            callers.push(tokio::spawn(async move {
                service
                    .request(
                        "peer-2",
                        MessageEnvelope::new(MessageType::SyncRequest, vec![], "peer-1"),
                        Some(Duration::from_secs(30)),
                    )
                    .await
            }));
        }
        while service.pending_requests() < 2 {
            tokio::task::yield_now().await;
        }

        assert_eq!(service.cancel_all("disconnect"), 2);
        assert_eq!(service.pending_requests(), 0);

        for caller in callers {
            let result = timeout(Duration::from_secs(1), caller)
                .await
                .expect("caller returns")
                .expect("caller join");
            match result {
                Err(MessagingError::ConnectionClosed { reason }) => {
                    assert_eq!(reason, "disconnect");
                }
                other => panic!("expected ConnectionClosed, got {other:?}"),
            }
        }
        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_handler_errors_surface_through_error_callback() {
        let peer = LoopbackPeer::new("peer-2");
        let service = engine(&peer, MessagingConfig::default());

        let reported: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        service.set_message_callback(Arc::new(|env| {
            Err(HandlerError::new(env.message_type, "unparseable payload"))
        }));
        {
            let reported = reported.clone();
            service.set_error_callback(Arc::new(move |error| {
                reported.lock().push(error.to_string());
            }));
        }

        peer.push_inbound(MessageEnvelope::new(MessageType::Block, vec![], "peer-2"));
        peer.push_inbound(MessageEnvelope::new(MessageType::Block, vec![], "peer-2"));
        service.shutdown().await;

        let reported = reported.lock();
        assert_eq!(reported.len(), 2);
        assert!(reported[0].contains("unparseable payload"));
        assert_eq!(service.metrics().handler_errors, 2);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_outstanding_and_drains_queue() {
        let peer = LoopbackPeer::new("peer-2");
        peer.set_responding(false);
        let service = engine(&peer, MessagingConfig::default());

        let handled = Arc::new(Mutex::new(0usize));
        {
            let handled = handled.clone();
            service.set_message_callback(Arc::new(move |_| {
                *handled.lock() += 1;
                Ok(())
            }));
        }

        let caller = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .request(
                        "peer-2",
                        MessageEnvelope::new(MessageType::SyncRequest, vec![], "peer-1"),
                        Some(Duration::from_secs(30)),
                    )
                    .await
            })
        };
        while service.pending_requests() < 1 {
            tokio::task::yield_now().await;
        }
        for _ in 0..5 {
            peer.push_inbound(MessageEnvelope::new(MessageType::Block, vec![], "peer-2"));
        }

        service.shutdown().await;

        // Backlog was processed before the worker exited.
        assert_eq!(*handled.lock(), 5);
        // The suspended caller was resolved, not leaked.
        let result = timeout(Duration::from_secs(1), caller)
            .await
            .expect("caller returns")
            .expect("caller join");
        assert!(matches!(
            result,
            Err(MessagingError::ConnectionClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_reaper_clears_abandoned_requests() {
        let peer = LoopbackPeer::new("peer-2");
        peer.set_responding(false);
        let config = MessagingConfig {
            sweep_interval: Duration::from_millis(20),
            ..MessagingConfig::default()
        };
        let service = engine(&peer, config);

        // A caller that gives up without awaiting its response.
        let caller = {
            let service = service.clone();
            tokio::spawn(async move {
                let _ = timeout(
                    Duration::from_millis(10),
                    service.request(
                        "peer-2",
                        MessageEnvelope::new(MessageType::SyncRequest, vec![], "peer-1"),
                        Some(Duration::from_millis(30)),
                    ),
                )
                .await;
            })
        };
        caller.await.expect("caller join");

        // Entry expires at 30ms; the sweep clears it within one interval.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(service.pending_requests(), 0);
        assert_eq!(service.metrics().timed_out, 1);
        service.shutdown().await;
    }
}
