// src/monitor/mod.rs

//! Node monitoring: one-shot watch re-arming, payload dedup, session-death
//! detection.

pub mod node_monitor;

pub use node_monitor::NodeMonitor;

/// Why a monitor stopped for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    SessionExpired,
    NotAuthorized,
}

/// Events a monitor delivers to its listener, in observation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// A tracked node exists and its payload is new or changed.
    DataChanged { path: String, data: String },
    /// The session is no longer valid; no further events will follow.
    Closing(CloseReason),
}
