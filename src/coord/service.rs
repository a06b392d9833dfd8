// src/coord/service.rs

//! The raw coordination-service primitive.
//!
//! The wire client for a real ensemble is out of scope for this crate; all
//! components talk to the service through [`CoordinationService`], which
//! models exactly the primitives the protocol needs:
//!
//! - existence check with an optional one-shot watch
//! - read / create / overwrite of a node's opaque string payload
//! - a session-wide event stream carrying watch firings and connection-state
//!   changes
//!
//! One instance corresponds to one session. Watches are one-shot: a watch
//! armed via `exists(path, true)` fires at most once and must be explicitly
//! re-armed by the caller.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tokio::sync::broadcast;

/// Error taxonomy for coordination operations.
///
/// `ConnectionLoss` is the only transient variant; `SessionExpired` and
/// `NotAuthorized` are terminal for the whole session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("connection to the coordination service was lost")]
    ConnectionLoss,

    #[error("the coordination session has expired")]
    SessionExpired,

    #[error("not authorized for this coordination session")]
    NotAuthorized,

    #[error("no node at {0}")]
    NoNode(String),

    #[error("node already exists at {0}")]
    NodeExists(String),

    #[error("coordination error: {0}")]
    Other(String),
}

impl CoordError {
    /// True for errors worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoordError::ConnectionLoss)
    }

    /// True for errors that invalidate the whole session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoordError::SessionExpired | CoordError::NotAuthorized)
    }
}

pub type CoordResult<T> = Result<T, CoordError>;

/// Connection-level state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Disconnected,
    Expired,
    NotAuthorized,
}

/// A single notification delivered on the session event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A watched node was created or its payload changed. One-shot: the watch
    /// for `path` is disarmed once this fires.
    NodeChanged { path: String },
    /// The connection state changed; not tied to any specific path.
    StateChanged(SessionState),
}

pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = CoordResult<T>> + Send + 'a>>;

/// Raw primitive offered by the coordination service, one instance per
/// session. Implementations must be shareable across tasks.
pub trait CoordinationService: Send + Sync {
    /// Check whether `path` exists; when `watch` is true, also arm a one-shot
    /// watch that fires on the next change of `path` (including creation).
    fn exists<'a>(&'a self, path: &'a str, watch: bool) -> ServiceFuture<'a, bool>;

    /// Read the payload at `path`; `None` when the node does not exist.
    fn get<'a>(&'a self, path: &'a str) -> ServiceFuture<'a, Option<String>>;

    /// Create `path` with the given payload; `NodeExists` when present.
    fn create<'a>(&'a self, path: &'a str, data: String) -> ServiceFuture<'a, ()>;

    /// Overwrite the payload at `path`; `NoNode` when absent.
    fn set<'a>(&'a self, path: &'a str, data: String) -> ServiceFuture<'a, ()>;

    /// Subscribe to the session event stream. Every subscriber sees every
    /// event from the point of subscription on, in delivery order.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
