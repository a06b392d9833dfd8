// tests/descriptor_loading.rs

//! Run-descriptor loading from real files: parsing, defaults, derived
//! dependency-state paths, and rejection of bad descriptors.

mod common;

use std::io::Write;

use fleetrun::config::{self, ProcessType};
use fleetrun::errors::FleetError;

fn descriptor_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_a_valid_descriptor() {
    let file = descriptor_file(
        r#"
[process.extract]
cmd = "/opt/jobs/extract"
args = "--input /data/raw"
type = "shell"
node = "/Pipeline/Extract"
deps = ["/Pipeline/Fetch", "/Master"]

[process.fetch]
cmd = "/opt/jobs/fetch"
node = "/Pipeline/Fetch"
"#,
    );

    let specs = config::load_and_validate(file.path()).unwrap();
    assert_eq!(specs.len(), 2);

    let extract = &specs[0];
    assert_eq!(extract.name, "extract");
    assert_eq!(extract.cmd, "/opt/jobs/extract");
    assert_eq!(extract.args, "--input /data/raw");
    assert_eq!(extract.process_type, ProcessType::Shell);
    assert_eq!(extract.state_path(), "/Pipeline/Extract/State");
    let dep_states: Vec<_> = extract.dependency_state_paths().iter().cloned().collect();
    // A dependency on /Master resolves to the master state node itself.
    assert_eq!(dep_states, vec!["/Master/State", "/Pipeline/Fetch/State"]);

    let fetch = &specs[1];
    assert_eq!(fetch.name, "fetch");
    assert_eq!(fetch.args, "");
    assert_eq!(fetch.process_type, ProcessType::Exe);
    assert!(fetch.dependency_state_paths().is_empty());
}

#[test]
fn rejects_two_processes_owning_one_node() {
    let file = descriptor_file(
        r#"
[process.a]
cmd = "/bin/a"
node = "/P/Shared"

[process.b]
cmd = "/bin/b"
node = "/P/Shared"
"#,
    );

    let err = config::load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, FleetError::Config(_)), "got: {err}");
}

#[test]
fn rejects_a_descriptor_missing_cmd() {
    let file = descriptor_file(
        r#"
[process.a]
node = "/P/A"
"#,
    );

    let err = config::load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, FleetError::Toml(_)), "got: {err}");
}

#[test]
fn rejects_an_unknown_process_type() {
    let file = descriptor_file(
        r#"
[process.a]
cmd = "/bin/a"
type = "binary"
node = "/P/A"
"#,
    );

    let err = config::load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, FleetError::Toml(_)), "got: {err}");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = config::load_and_validate("/no/such/descriptor.toml").unwrap_err();
    assert!(matches!(err, FleetError::Io(_)), "got: {err}");
}
