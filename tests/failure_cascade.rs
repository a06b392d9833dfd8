// tests/failure_cascade.rs

//! Full-agent scenario: one failing process halts the fleet, kills an
//! unrelated running process, and keeps a blocked dependent from ever
//! starting.

#![cfg(unix)]

mod common;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use fleetrun::agent;
use fleetrun::coord::paths::MASTER_STATE_PATH;
use fleetrun::coord::{CoordClient, MemoryTree};
use fleetrun::seeder::{self, SeedMode};

use common::{ProcessSpecBuilder, init_tracing, wait_until};

fn script(dir: &Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path.to_string_lossy().into_owned()
}

fn state_of(tree: &MemoryTree, node: &str) -> Option<String> {
    tree.read(&format!("{node}/State"))
}

#[tokio::test]
async fn one_failure_halts_the_whole_fleet() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let flag = dir.path().join("fail-now");

    // A blocks until the flag file appears, then exits non-zero. C just runs
    // for a long time. B depends on A and must never get to run.
    let fail_cmd = script(
        dir.path(),
        "fail-on-flag.sh",
        &format!(
            "#!/bin/sh\nwhile [ ! -f \"{}\" ]; do sleep 0.05; done\nexit 1\n",
            flag.display()
        ),
    );
    let long_cmd = script(dir.path(), "long.sh", "#!/bin/sh\nsleep 30\n");

    let specs = vec![
        ProcessSpecBuilder::new("a", "/Fleet/A").cmd(&fail_cmd).build(),
        ProcessSpecBuilder::new("b", "/Fleet/B").cmd("true").dep("/Fleet/A").build(),
        ProcessSpecBuilder::new("c", "/Fleet/C").cmd(&long_cmd).build(),
    ];

    let tree = MemoryTree::new();
    let client = CoordClient::new(Arc::new(tree.session()));

    let nodes: BTreeMap<String, String> = [
        ("/Fleet/A".to_string(), "flag-gated failure".to_string()),
        ("/Fleet/B".to_string(), "blocked dependent".to_string()),
        ("/Fleet/C".to_string(), "long runner".to_string()),
    ]
    .into_iter()
    .collect();
    seeder::seed(&client, &nodes, SeedMode::Start).await.unwrap();

    tokio::spawn(agent::run_agent(client.clone(), specs));

    // Both dependency-free processes come up.
    wait_until("A running", || {
        state_of(&tree, "/Fleet/A").as_deref() == Some("IN_PROGRESS")
    })
    .await;
    wait_until("C running", || {
        state_of(&tree, "/Fleet/C").as_deref() == Some("IN_PROGRESS")
    })
    .await;

    std::fs::write(&flag, "").unwrap();

    wait_until("A records ERROR", || {
        state_of(&tree, "/Fleet/A").as_deref() == Some("ERROR")
    })
    .await;
    wait_until("master token forced to stop", || {
        tree.read(MASTER_STATE_PATH).as_deref() == Some("stop")
    })
    .await;
    // The stop propagates: C's coordinator kills its child.
    wait_until("C killed and recorded as ERROR", || {
        state_of(&tree, "/Fleet/C").as_deref() == Some("ERROR")
    })
    .await;

    // B's dependency never succeeded, so B never left idle.
    assert_eq!(state_of(&tree, "/Fleet/B").as_deref(), Some("IDLE"));
}
