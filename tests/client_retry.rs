// tests/client_retry.rs

//! Retry and path-creation behavior of the shared coordination client,
//! using the in-memory backend's fault-injection hooks.

mod common;

use std::sync::Arc;
use std::time::Duration;

use fleetrun::coord::{CoordClient, CoordError, MemoryCoordination, MemoryTree, RetryConfig};

use common::init_tracing;

fn fast_client(session: &MemoryCoordination, attempts: u32) -> CoordClient {
    CoordClient::with_retry(
        Arc::new(session.clone()),
        RetryConfig {
            attempts,
            base_delay: Duration::from_millis(1),
        },
    )
}

#[tokio::test]
async fn transient_connection_loss_is_retried_until_success() {
    init_tracing();
    let tree = MemoryTree::new();
    let session = tree.session();
    let client = fast_client(&session, 10);

    session.fail_next(3);
    client.set_data("/R/A", "payload").await.unwrap();

    assert_eq!(tree.read("/R/A").as_deref(), Some("payload"));
    // The failed attempts actually hit the session.
    assert!(session.op_count() > 3);
}

#[tokio::test]
async fn exhausted_retry_budget_surfaces_the_transient_error() {
    init_tracing();
    let tree = MemoryTree::new();
    let session = tree.session();
    let client = fast_client(&session, 3);

    session.fail_next(100);
    let err = client.set_data("/R/A", "payload").await.unwrap_err();
    assert_eq!(err, CoordError::ConnectionLoss);
}

#[tokio::test]
async fn expired_session_is_never_retried() {
    init_tracing();
    let tree = MemoryTree::new();
    let session = tree.session();
    let client = fast_client(&session, 10);

    session.expire();
    let ops_before = session.op_count();
    let err = client.set_data("/R/A", "payload").await.unwrap_err();
    assert_eq!(err, CoordError::SessionExpired);
    // A fatal error costs exactly one attempt.
    assert_eq!(session.op_count(), ops_before + 1);
}

#[tokio::test]
async fn ensure_path_exists_creates_every_missing_segment() {
    init_tracing();
    let tree = MemoryTree::new();
    let session = tree.session();
    let client = fast_client(&session, 10);

    client.ensure_path_exists("/A/B/C").await.unwrap();
    assert_eq!(tree.paths(), vec!["/A", "/A/B", "/A/B/C"]);

    // Idempotent on a second pass.
    client.ensure_path_exists("/A/B/C").await.unwrap();
    assert_eq!(tree.paths(), vec!["/A", "/A/B", "/A/B/C"]);
}

#[tokio::test]
async fn ensure_path_exists_leaves_existing_payloads_alone() {
    init_tracing();
    let tree = MemoryTree::new();
    tree.write("/A", "");
    tree.write("/A/B", "precious");
    let session = tree.session();
    let client = fast_client(&session, 10);

    client.ensure_path_exists("/A/B/C").await.unwrap();
    assert_eq!(tree.read("/A/B").as_deref(), Some("precious"));
    assert_eq!(tree.read("/A/B/C").as_deref(), Some(""));
}

#[tokio::test]
async fn set_data_creates_parents_and_overwrites() {
    init_tracing();
    let tree = MemoryTree::new();
    let session = tree.session();
    let client = fast_client(&session, 10);

    client.set_data("/P/X/State", "IDLE").await.unwrap();
    client.set_data("/P/X/State", "SUCCESS").await.unwrap();

    assert_eq!(tree.read("/P/X/State").as_deref(), Some("SUCCESS"));
    assert_eq!(tree.read("/P").as_deref(), Some(""));
    assert_eq!(tree.read("/P/X").as_deref(), Some(""));
}

#[tokio::test]
async fn get_data_reads_absent_nodes_as_empty() {
    init_tracing();
    let tree = MemoryTree::new();
    let session = tree.session();
    let client = fast_client(&session, 10);

    assert_eq!(client.get_data("/Nothing/Here").await, "");

    tree.write("/Something", "value");
    assert_eq!(client.get_data("/Something").await, "value");
}
