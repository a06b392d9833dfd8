// src/agent.rs

//! The per-machine agent: one monitor + coordinator pair per locally-owned
//! process, all sharing a single coordination session.

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::ProcessSpec;
use crate::coord::client::CoordClient;
use crate::errors::Result;
use crate::exec::ProcessExecutor;
use crate::monitor::NodeMonitor;
use crate::runner::DependencyCoordinator;

/// Run coordinators for every process in the descriptor until the session
/// dies (all coordinator loops end on the monitors' death events).
pub async fn run_agent(client: CoordClient, specs: Vec<ProcessSpec>) -> Result<()> {
    if specs.is_empty() {
        warn!("descriptor lists no processes; agent has nothing to do");
        return Ok(());
    }

    info!(processes = specs.len(), "launching coordinators");

    let mut tasks = JoinSet::new();
    for spec in specs {
        let (monitor_tx, monitor_rx) = mpsc::unbounded_channel();

        let monitor = NodeMonitor::new(client.clone(), spec.watched_paths(), monitor_tx);
        tasks.spawn(monitor.run());

        let executor = ProcessExecutor::new(client.clone(), spec.clone());
        let coordinator = DependencyCoordinator::new(client.clone(), spec, executor, monitor_rx);
        tasks.spawn(coordinator.run());
    }

    while let Some(res) = tasks.join_next().await {
        if let Err(err) = res {
            warn!(error = %err, "agent task ended abnormally");
        }
    }

    info!("all coordinators stopped; agent exiting");
    Ok(())
}
