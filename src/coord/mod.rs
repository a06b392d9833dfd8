// src/coord/mod.rs

//! Coordination layer: tree layout, state tokens, the raw service primitive,
//! the in-memory reference backend, and the shared retrying client.

pub mod client;
pub mod memory;
pub mod paths;
pub mod service;
pub mod state;

use std::sync::Arc;

use crate::errors::{FleetError, Result};

pub use client::{CoordClient, RetryConfig};
pub use memory::{MemoryCoordination, MemoryTree};
pub use service::{
    CoordError, CoordResult, CoordinationService, SessionEvent, SessionState,
};
pub use state::{MasterState, ProcessState};

/// Open a session on the coordination service named by `target`.
///
/// Currently only the process-local `mem://` backend is built in; real
/// ensemble clients are injected behind [`CoordinationService`] by embedders.
pub fn connect(target: &str) -> Result<Arc<dyn CoordinationService>> {
    if target.strip_prefix("mem://").is_some() {
        return Ok(Arc::new(MemoryTree::new().session()));
    }
    Err(FleetError::Config(format!(
        "unsupported coordination target '{target}' (supported: mem://)"
    )))
}
