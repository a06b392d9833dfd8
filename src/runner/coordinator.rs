// src/runner/coordinator.rs

//! The per-process dependency coordinator.
//!
//! Consumes monitor events for one owned process, keeps the tracked signals
//! in [`RuntimeState`], and drives the actuator. Evaluation happens
//! synchronously per event on a single consumer loop, so the coordinator is
//! never re-entered concurrently.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::ProcessSpec;
use crate::coord::client::CoordClient;
use crate::coord::paths::MASTER_STATE_PATH;
use crate::coord::state::{MasterState, ProcessState};
use crate::exec::ProcessActuator;
use crate::monitor::MonitorEvent;
use crate::runner::state::{Action, RuntimeState};

pub struct DependencyCoordinator<A: ProcessActuator> {
    client: CoordClient,
    spec: ProcessSpec,
    actuator: A,
    state: RuntimeState,
    monitor_rx: mpsc::UnboundedReceiver<MonitorEvent>,
}

impl<A: ProcessActuator> DependencyCoordinator<A> {
    pub fn new(
        client: CoordClient,
        spec: ProcessSpec,
        actuator: A,
        monitor_rx: mpsc::UnboundedReceiver<MonitorEvent>,
    ) -> Self {
        let state = RuntimeState::new(&spec);
        Self {
            client,
            spec,
            actuator,
            state,
            monitor_rx,
        }
    }

    /// Seed the tracked signals, then react to monitor events until the
    /// session dies.
    pub async fn run(mut self) {
        info!(node = %self.spec.node, "coordinator starting");

        self.init_process_states().await;

        loop {
            match self.monitor_rx.recv().await {
                Some(MonitorEvent::DataChanged { path, data }) => {
                    self.handle_update(&path, &data).await;
                }
                Some(MonitorEvent::Closing(reason)) => {
                    info!(node = %self.spec.node, ?reason, "monitor reported session death");
                    break;
                }
                None => {
                    debug!(node = %self.spec.node, "monitor channel closed");
                    break;
                }
            }
        }

        info!(node = %self.spec.node, "coordinator stopped");
    }

    /// One-time seeding of master, dependency, and own states via unwatched
    /// reads, before any callback is processed.
    async fn init_process_states(&mut self) {
        let master_token = self.client.get_data(MASTER_STATE_PATH).await;
        self.state.master = MasterState::from_token(&master_token);

        let dep_paths: Vec<String> = self.state.deps.keys().cloned().collect();
        for dep in dep_paths {
            // A dependency on the master node is translated into the process
            // state space so the evaluation rule stays uniform.
            let state = if dep == MASTER_STATE_PATH {
                if self.state.master == MasterState::Started {
                    ProcessState::Success
                } else {
                    ProcessState::Idle
                }
            } else {
                ProcessState::from_token(&self.client.get_data(&dep).await)
            };
            self.state.deps.insert(dep, state);
        }

        let own_token = self.client.get_data(&self.spec.state_path()).await;
        self.state.self_state = ProcessState::from_token(&own_token);

        debug!(
            node = %self.spec.node,
            master = ?self.state.master,
            self_state = ?self.state.self_state,
            deps = ?self.state.deps,
            "seeded process states"
        );
    }

    /// Apply one observed payload and act on the combined state.
    async fn handle_update(&mut self, path: &str, data: &str) {
        self.state.apply(path, data);

        match self.state.decide() {
            Action::Start => self.actuator.start(),
            Action::Stop => self.actuator.stop("stopping process").await,
            Action::Hold => {}
        }
    }
}
