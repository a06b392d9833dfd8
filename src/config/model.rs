// src/config/model.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::coord::paths::{self, SUFFIX_STATE};

/// Top-level run descriptor as read from a TOML file.
///
/// One `[process.<name>]` table per process this machine owns:
///
/// ```toml
/// [process.extract]
/// cmd = "/opt/jobs/extract"
/// args = "--input /data/raw"
/// type = "exe"
/// node = "/Pipeline/Extract"
/// deps = ["/Pipeline/Fetch"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptorFile {
    /// All processes from `[process.<name>]`, keyed by process name.
    #[serde(default)]
    pub process: BTreeMap<String, ProcessEntry>,
}

/// `[process.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessEntry {
    /// Path of the command to execute.
    pub cmd: String,

    /// Argument string. Split on ASCII whitespace at spawn time; arguments
    /// containing spaces cannot be expressed (inherited descriptor
    /// limitation, kept as-is).
    #[serde(default)]
    pub args: String,

    /// Informational process-type tag. Carried through but not used for
    /// dispatch.
    #[serde(rename = "type", default)]
    pub process_type: ProcessType,

    /// The coordination-tree node this process owns.
    pub node: String,

    /// Dependency node paths; may be empty.
    #[serde(default)]
    pub deps: Vec<String>,
}

/// Informational tag describing what kind of executable a process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    Java,
    Shell,
    Exe,
    Gradle,
}

impl Default for ProcessType {
    fn default() -> Self {
        ProcessType::Exe
    }
}

/// A validated, immutable process specification.
///
/// The derived dependency-*state* paths (dependency node + `/State`) are
/// computed once here; they, not the raw dependency paths, are what gets
/// watched and evaluated.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub name: String,
    pub cmd: String,
    pub args: String,
    pub process_type: ProcessType,
    pub node: String,
    pub deps: Vec<String>,
    dep_state_paths: BTreeSet<String>,
}

impl ProcessSpec {
    pub fn new(
        name: impl Into<String>,
        cmd: impl Into<String>,
        args: impl Into<String>,
        process_type: ProcessType,
        node: impl Into<String>,
        deps: Vec<String>,
    ) -> Self {
        let dep_state_paths = deps
            .iter()
            .map(|dep| paths::sub_node(dep, SUFFIX_STATE))
            .collect();
        Self {
            name: name.into(),
            cmd: cmd.into(),
            args: args.into(),
            process_type,
            node: node.into(),
            deps,
            dep_state_paths,
        }
    }

    pub fn from_entry(name: &str, entry: &ProcessEntry) -> Self {
        Self::new(
            name,
            entry.cmd.clone(),
            entry.args.clone(),
            entry.process_type,
            entry.node.clone(),
            entry.deps.clone(),
        )
    }

    /// The state node this process write-owns (`<node>/State`).
    pub fn state_path(&self) -> String {
        paths::sub_node(&self.node, SUFFIX_STATE)
    }

    /// Sub-node of this process's own node.
    pub fn sub_node(&self, suffix: &str) -> String {
        paths::sub_node(&self.node, suffix)
    }

    /// Derived `/State` paths of every dependency.
    pub fn dependency_state_paths(&self) -> &BTreeSet<String> {
        &self.dep_state_paths
    }

    /// The full set of paths this process's monitor watches: every dependency
    /// state path, the master state node, and its own state node.
    pub fn watched_paths(&self) -> Vec<String> {
        let mut set = self.dep_state_paths.clone();
        set.insert(paths::MASTER_STATE_PATH.to_string());
        set.insert(self.state_path());
        set.into_iter().collect()
    }
}
