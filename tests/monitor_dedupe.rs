// tests/monitor_dedupe.rs

//! Monitor behavior over the in-memory backend: first observation, payload
//! deduplication, and absent nodes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use fleetrun::coord::{CoordClient, MemoryCoordination, MemoryTree, RetryConfig};
use fleetrun::monitor::{MonitorEvent, NodeMonitor};

use common::{init_tracing, wait_until, with_timeout};

fn fast_client(session: &MemoryCoordination) -> CoordClient {
    CoordClient::with_retry(
        Arc::new(session.clone()),
        RetryConfig {
            attempts: 10,
            base_delay: Duration::from_millis(1),
        },
    )
}

fn spawn_monitor(
    session: &MemoryCoordination,
    paths: &[&str],
) -> mpsc::UnboundedReceiver<MonitorEvent> {
    let client = CoordClient::new(Arc::new(session.clone()));
    let (tx, rx) = mpsc::unbounded_channel();
    let monitor = NodeMonitor::new(
        client,
        paths.iter().map(|p| p.to_string()).collect(),
        tx,
    );
    tokio::spawn(monitor.run());
    rx
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<MonitorEvent>) -> MonitorEvent {
    with_timeout(rx.recv()).await.expect("monitor channel closed")
}

async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<MonitorEvent>) {
    let outcome = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(outcome.is_err(), "unexpected monitor event: {:?}", outcome);
}

#[tokio::test]
async fn first_observation_is_reported_as_a_change() {
    init_tracing();
    let tree = MemoryTree::new();
    tree.write("/P/A/State", "IDLE");

    let session = tree.session();
    let mut rx = spawn_monitor(&session, &["/P/A/State"]);

    assert_eq!(
        recv(&mut rx).await,
        MonitorEvent::DataChanged {
            path: "/P/A/State".to_string(),
            data: "IDLE".to_string(),
        }
    );
}

#[tokio::test]
async fn identical_payload_rewrite_is_suppressed() {
    init_tracing();
    let tree = MemoryTree::new();
    tree.write("/P/A/State", "IDLE");

    let session = tree.session();
    let mut rx = spawn_monitor(&session, &["/P/A/State"]);
    recv(&mut rx).await;

    // Rewrite the same payload; the fired watch makes the monitor re-check
    // and re-arm, but the listener must not hear about it.
    let ops_before = session.op_count();
    tree.write("/P/A/State", "IDLE");
    wait_until("watch re-armed after duplicate write", || {
        session.op_count() > ops_before
    })
    .await;
    assert_silent(&mut rx).await;

    // A genuinely new payload still gets through.
    tree.write("/P/A/State", "SUCCESS");
    assert_eq!(
        recv(&mut rx).await,
        MonitorEvent::DataChanged {
            path: "/P/A/State".to_string(),
            data: "SUCCESS".to_string(),
        }
    );
}

#[tokio::test]
async fn absent_node_produces_no_event_until_created() {
    init_tracing();
    let tree = MemoryTree::new();

    let session = tree.session();
    let mut rx = spawn_monitor(&session, &["/P/Missing/State"]);

    // Nothing exists, so the listener hears nothing.
    assert_silent(&mut rx).await;

    // The exists+watch request armed a watch even though the node was
    // absent; creation is the first observable change.
    tree.write("/P/Missing/State", "IDLE");
    assert_eq!(
        recv(&mut rx).await,
        MonitorEvent::DataChanged {
            path: "/P/Missing/State".to_string(),
            data: "IDLE".to_string(),
        }
    );
}

#[tokio::test]
async fn transient_burst_while_arming_does_not_lose_the_watch() {
    init_tracing();
    let tree = MemoryTree::new();
    let session = tree.session();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // The first two requests fail with connection loss; the watch must
    // still end up armed.
    session.fail_next(2);
    let monitor = NodeMonitor::new(fast_client(&session), vec!["/P/A/State".to_string()], tx);
    tokio::spawn(monitor.run());

    tree.write("/P/A/State", "SUCCESS");
    assert_eq!(
        recv(&mut rx).await,
        MonitorEvent::DataChanged {
            path: "/P/A/State".to_string(),
            data: "SUCCESS".to_string(),
        }
    );
}

#[tokio::test]
async fn transient_failures_during_rearm_are_retried() {
    init_tracing();
    let tree = MemoryTree::new();
    tree.write("/P/A/State", "IDLE");

    let session = tree.session();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let monitor = NodeMonitor::new(fast_client(&session), vec!["/P/A/State".to_string()], tx);
    tokio::spawn(monitor.run());
    recv(&mut rx).await;

    // Connection loss while answering the fired watch must not sever the
    // path; the re-arm keeps retrying until it lands.
    session.fail_next(3);
    tree.write("/P/A/State", "SUCCESS");
    assert_eq!(
        recv(&mut rx).await,
        MonitorEvent::DataChanged {
            path: "/P/A/State".to_string(),
            data: "SUCCESS".to_string(),
        }
    );
}

#[tokio::test]
async fn untracked_nodes_are_ignored() {
    init_tracing();
    let tree = MemoryTree::new();
    tree.write("/P/A/State", "IDLE");

    let session = tree.session();
    let mut rx = spawn_monitor(&session, &["/P/A/State"]);
    recv(&mut rx).await;

    tree.write("/Q/Other/State", "SUCCESS");
    assert_silent(&mut rx).await;
}
