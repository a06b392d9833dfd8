#![allow(dead_code)]

use fleetrun::config::{ProcessSpec, ProcessType};

/// Builder for `ProcessSpec` to simplify test setup.
pub struct ProcessSpecBuilder {
    name: String,
    cmd: String,
    args: String,
    process_type: ProcessType,
    node: String,
    deps: Vec<String>,
}

impl ProcessSpecBuilder {
    pub fn new(name: &str, node: &str) -> Self {
        Self {
            name: name.to_string(),
            cmd: "true".to_string(),
            args: String::new(),
            process_type: ProcessType::Exe,
            node: node.to_string(),
            deps: Vec::new(),
        }
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.cmd = cmd.to_string();
        self
    }

    pub fn args(mut self, args: &str) -> Self {
        self.args = args.to_string();
        self
    }

    pub fn process_type(mut self, process_type: ProcessType) -> Self {
        self.process_type = process_type;
        self
    }

    pub fn dep(mut self, dep: &str) -> Self {
        self.deps.push(dep.to_string());
        self
    }

    pub fn build(self) -> ProcessSpec {
        ProcessSpec::new(
            self.name,
            self.cmd,
            self.args,
            self.process_type,
            self.node,
            self.deps,
        )
    }
}
