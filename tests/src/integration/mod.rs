//! End-to-end flows through the correlation engine over the loopback peer.

pub mod lifecycle;
