// src/coord/state.rs

//! Enum views of the raw state tokens stored in the coordination tree.

use crate::coord::paths;

/// Lifecycle state of a process node, derived from its `/State` token.
///
/// `Unknown` is reserved for "not yet observed"; any token actually read from
/// the tree maps to a concrete state, with unrecognized tokens treated as
/// `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Unknown,
    Idle,
    InProgress,
    Success,
    Error,
}

impl ProcessState {
    /// Map a `/State` token to a state by exact match.
    pub fn from_token(token: &str) -> Self {
        match token {
            paths::STATE_IDLE => ProcessState::Idle,
            paths::STATE_IN_PROGRESS => ProcessState::InProgress,
            paths::STATE_SUCCESS => ProcessState::Success,
            paths::STATE_ERROR => ProcessState::Error,
            _ => ProcessState::Idle,
        }
    }
}

/// Global run/stop signal derived from the `/Master/State` token.
///
/// `start` and `continue` both enable the fleet; every other token (including
/// an in-progress token) reads as `Stopped`. `Unknown` only before the master
/// node has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterState {
    Unknown,
    Started,
    Stopped,
}

impl MasterState {
    pub fn from_token(token: &str) -> Self {
        match token {
            paths::MASTER_START | paths::MASTER_CONTINUE => MasterState::Started,
            _ => MasterState::Stopped,
        }
    }
}
