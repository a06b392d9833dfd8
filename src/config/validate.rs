// src/config/validate.rs

//! Semantic validation of the run descriptor.

use std::collections::BTreeSet;

use crate::config::model::{DescriptorFile, ProcessSpec};
use crate::errors::{FleetError, Result};

/// Validate a raw descriptor and build the immutable `ProcessSpec` list.
///
/// Checks:
/// - at least one process entry
/// - non-empty `cmd`
/// - '/'-prefixed, non-root `node`, unique across the descriptor
/// - '/'-prefixed dependency paths, no self-dependency
pub fn validate(raw: &DescriptorFile) -> Result<Vec<ProcessSpec>> {
    if raw.process.is_empty() {
        return Err(config_err("descriptor contains no [process.*] entries"));
    }

    let mut owned_nodes: BTreeSet<&str> = BTreeSet::new();
    let mut specs = Vec::with_capacity(raw.process.len());

    for (name, entry) in &raw.process {
        if entry.cmd.trim().is_empty() {
            return Err(config_err(format!("process '{name}': cmd is empty")));
        }
        check_node_path(name, "node", &entry.node)?;
        if !owned_nodes.insert(entry.node.as_str()) {
            return Err(config_err(format!(
                "process '{name}': node '{}' is owned by more than one process",
                entry.node
            )));
        }
        for dep in &entry.deps {
            check_node_path(name, "dependency", dep)?;
            if dep == &entry.node {
                return Err(config_err(format!(
                    "process '{name}': depends on its own node '{dep}'"
                )));
            }
        }
        specs.push(ProcessSpec::from_entry(name, entry));
    }

    Ok(specs)
}

fn check_node_path(process: &str, what: &str, path: &str) -> Result<()> {
    if path.len() < 2 || !path.starts_with('/') || path.ends_with('/') {
        return Err(config_err(format!(
            "process '{process}': {what} path '{path}' must be a '/'-prefixed node path"
        )));
    }
    Ok(())
}

fn config_err(msg: impl Into<String>) -> FleetError {
    FleetError::Config(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{ProcessEntry, ProcessType};
    use std::collections::BTreeMap;

    fn entry(cmd: &str, node: &str, deps: &[&str]) -> ProcessEntry {
        ProcessEntry {
            cmd: cmd.to_string(),
            args: String::new(),
            process_type: ProcessType::Exe,
            node: node.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn descriptor(entries: Vec<(&str, ProcessEntry)>) -> DescriptorFile {
        DescriptorFile {
            process: entries
                .into_iter()
                .map(|(n, e)| (n.to_string(), e))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn accepts_valid_descriptor() {
        let raw = descriptor(vec![
            ("a", entry("/bin/a", "/P/A", &[])),
            ("b", entry("/bin/b", "/P/B", &["/P/A"])),
        ]);
        let specs = validate(&raw).unwrap();
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn rejects_duplicate_owned_node() {
        let raw = descriptor(vec![
            ("a", entry("/bin/a", "/P/A", &[])),
            ("b", entry("/bin/b", "/P/A", &[])),
        ]);
        assert!(matches!(validate(&raw), Err(FleetError::Config(_))));
    }

    #[test]
    fn rejects_relative_dependency_path() {
        let raw = descriptor(vec![("a", entry("/bin/a", "/P/A", &["P/B"]))]);
        assert!(matches!(validate(&raw), Err(FleetError::Config(_))));
    }

    #[test]
    fn rejects_self_dependency() {
        let raw = descriptor(vec![("a", entry("/bin/a", "/P/A", &["/P/A"]))]);
        assert!(matches!(validate(&raw), Err(FleetError::Config(_))));
    }

    #[test]
    fn rejects_empty_descriptor() {
        let raw = descriptor(vec![]);
        assert!(matches!(validate(&raw), Err(FleetError::Config(_))));
    }
}
