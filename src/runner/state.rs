// src/runner/state.rs

//! Pure per-coordinator state core.
//!
//! This module contains a synchronous, deterministic view of the tracked
//! signals (master state, dependency states, own state) and the start/stop
//! decision rule. It performs no IO and is unit tested without Tokio,
//! channels, or processes; the async shell lives in
//! [`coordinator`](super::coordinator).

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ProcessSpec;
use crate::coord::paths::MASTER_STATE_PATH;
use crate::coord::state::{MasterState, ProcessState};

/// What the coordinator should do after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    /// Master is running but the start conditions are not met; in particular
    /// this process's own run must not be disturbed.
    Hold,
}

/// Which tracked signal a path maps to. Classification priority is master,
/// then dependency, then own state, for paths matching more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Master,
    Dependency,
    OwnState,
}

/// Tracked signals for one coordinator instance.
///
/// Owned exclusively by that coordinator and mutated only from its event
/// loop; dependency paths are pre-populated at construction and stay
/// `Unknown` until first observed or seeded.
#[derive(Debug)]
pub struct RuntimeState {
    own_state_path: String,
    pub master: MasterState,
    pub self_state: ProcessState,
    pub deps: BTreeMap<String, ProcessState>,
}

impl RuntimeState {
    pub fn new(spec: &ProcessSpec) -> Self {
        let deps = spec
            .dependency_state_paths()
            .iter()
            .map(|p| (p.clone(), ProcessState::Unknown))
            .collect();
        Self {
            own_state_path: spec.state_path(),
            master: MasterState::Unknown,
            self_state: ProcessState::Unknown,
            deps,
        }
    }

    /// Classify a callback path against the tracked signals.
    pub fn classify(&self, path: &str) -> Option<Signal> {
        if path == MASTER_STATE_PATH {
            Some(Signal::Master)
        } else if self.deps.contains_key(path) {
            Some(Signal::Dependency)
        } else if path == self.own_state_path {
            Some(Signal::OwnState)
        } else {
            None
        }
    }

    /// Update the signal for `path` from a raw token. Returns false for
    /// untracked paths.
    pub fn apply(&mut self, path: &str, token: &str) -> bool {
        match self.classify(path) {
            Some(Signal::Master) => {
                self.master = MasterState::from_token(token);
                debug!(?self.master, "updated master state");
            }
            Some(Signal::Dependency) => {
                let state = ProcessState::from_token(token);
                debug!(dep = %path, ?state, "updated dependency state");
                self.deps.insert(path.to_string(), state);
            }
            Some(Signal::OwnState) => {
                self.self_state = ProcessState::from_token(token);
                debug!(?self.self_state, "updated own state");
            }
            None => {
                debug!(path = %path, "callback for untracked path");
                return false;
            }
        }
        true
    }

    pub fn all_deps_succeeded(&self) -> bool {
        self.deps.values().all(|s| *s == ProcessState::Success)
    }

    /// The start rule: master started, every dependency succeeded (vacuously
    /// true with no dependencies), and this process idle.
    ///
    /// While the master is started but the conditions are not met the
    /// coordinator holds: a run in progress is left alone. Only a
    /// non-started master stops the process.
    pub fn decide(&self) -> Action {
        if self.master == MasterState::Started {
            if self.all_deps_succeeded() && self.self_state == ProcessState::Idle {
                Action::Start
            } else {
                Action::Hold
            }
        } else {
            Action::Stop
        }
    }
}
