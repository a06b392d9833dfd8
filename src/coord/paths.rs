// src/coord/paths.rs

//! Canonical layout of the coordination tree.
//!
//! Every path and token the fleet agrees on lives here; nothing else in the
//! crate spells out a literal node path or state token.

/// The global run-control node gating all coordinators fleet-wide.
pub const MASTER_STATE_PATH: &str = "/Master/State";

/// Master token: enable all coordinators.
pub const MASTER_START: &str = "start";
/// Master token: enable all coordinators, resuming a previous run.
pub const MASTER_CONTINUE: &str = "continue";
/// Master token: halt running children and prevent new starts.
pub const MASTER_STOP: &str = "stop";

/// Process lifecycle tokens stored under `<node>/State`.
pub const STATE_IDLE: &str = "IDLE";
pub const STATE_IN_PROGRESS: &str = "IN_PROGRESS";
pub const STATE_SUCCESS: &str = "SUCCESS";
pub const STATE_ERROR: &str = "ERROR";

/// Sub-node suffixes under a process node.
pub const SUFFIX_STATE: &str = "/State";
pub const SUFFIX_STATE_INFO: &str = "/StateInfo";
pub const SUFFIX_DESCRIPTION: &str = "/Description";
pub const SUFFIX_TIMESTAMP_START: &str = "/Timestamp/Start";
pub const SUFFIX_TIMESTAMP_END: &str = "/Timestamp/End";

/// Join a process node path with one of the `SUFFIX_*` constants.
pub fn sub_node(node: &str, suffix: &str) -> String {
    format!("{node}{suffix}")
}
