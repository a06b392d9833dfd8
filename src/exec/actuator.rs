// src/exec/actuator.rs

//! Pluggable process-actuator abstraction.
//!
//! The dependency coordinator talks to a `ProcessActuator` instead of the
//! concrete executor. This makes it easy to drive the coordinator with a
//! recording fake in tests while keeping the production implementation in
//! [`executor`](super::executor).

use std::future::Future;
use std::pin::Pin;

/// Trait abstracting how start/stop decisions are acted on.
///
/// Production code uses [`ProcessExecutor`](super::ProcessExecutor); tests can
/// provide their own implementation that doesn't spawn real processes.
pub trait ProcessActuator: Send {
    /// Start the owned process if it is not already running. Must be a no-op
    /// for duplicate invocations while a child is alive.
    fn start(&mut self);

    /// Forcibly terminate the owned process, resolving once it has exited.
    /// No-op when nothing is running.
    fn stop<'a>(&'a mut self, reason: &str) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}
