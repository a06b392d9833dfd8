// src/runner/mod.rs

//! Dependency coordination: the pure state core and the per-process
//! coordinator loop.

pub mod coordinator;
pub mod state;

pub use coordinator::DependencyCoordinator;
pub use state::{Action, RuntimeState, Signal};
