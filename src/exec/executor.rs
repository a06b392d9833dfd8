// src/exec/executor.rs

//! Child-process lifecycle engine.
//!
//! Spawns and kills the one external process a coordinator owns, relays its
//! output line-by-line into the coordination tree, and records the terminal
//! outcome. A non-zero exit is escalated into a fleet-wide abort by forcing
//! the master token to `stop`.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::config::ProcessSpec;
use crate::coord::client::CoordClient;
use crate::coord::paths::{
    self, MASTER_STATE_PATH, MASTER_STOP, STATE_ERROR, STATE_IN_PROGRESS, STATE_SUCCESS,
    SUFFIX_STATE, SUFFIX_STATE_INFO, SUFFIX_TIMESTAMP_END, SUFFIX_TIMESTAMP_START,
};
use crate::exec::actuator::ProcessActuator;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn wall_clock_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Handle for the currently-running child, if any.
///
/// - `kill` asks the execution task to terminate the child.
/// - `handle` is the Tokio task driving the child to completion.
struct ActiveChild {
    kill: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

/// Runs the external process owned by one coordinator.
///
/// At most one child is alive per executor at any time; `start` requests that
/// arrive while a child is running are ignored.
#[derive(Clone)]
pub struct ProcessExecutor {
    client: CoordClient,
    spec: ProcessSpec,
    active: Arc<Mutex<Option<ActiveChild>>>,
}

impl ProcessExecutor {
    pub fn new(client: CoordClient, spec: ProcessSpec) -> Self {
        Self {
            client,
            spec,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether a child is currently recorded as running.
    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|a| !a.handle.is_finished())
    }

    /// Launch the execution task for this process and return immediately.
    ///
    /// No-op when a child is already recorded and still running; rapid
    /// repeated watch callbacks must not produce two concurrent children.
    pub fn start_process(&self) {
        let mut slot = self.active.lock().unwrap();
        if let Some(active) = slot.as_ref() {
            if !active.handle.is_finished() {
                debug!(
                    process = %self.spec.cmd,
                    node = %self.spec.node,
                    "child already running; ignoring duplicate start"
                );
                return;
            }
        }

        info!(process = %self.spec.cmd, node = %self.spec.node, "starting execution task");
        let (kill_tx, kill_rx) = oneshot::channel();
        let client = self.client.clone();
        let spec = self.spec.clone();
        let handle = tokio::spawn(async move {
            if let Err(err) = run_child(&client, &spec, kill_rx).await {
                // Faults never propagate to the caller; the only visible
                // effect is that /State does not reach SUCCESS.
                error!(process = %spec.cmd, node = %spec.node, error = %err, "execution task error");
            }
        });

        *slot = Some(ActiveChild {
            kill: Some(kill_tx),
            handle,
        });
    }

    /// Forcibly terminate the child, if any, and wait until it has exited.
    pub async fn stop_process(&self, reason: &str) {
        let taken = self.active.lock().unwrap().take();
        if let Some(mut active) = taken {
            if !active.handle.is_finished() {
                info!(node = %self.spec.node, reason, "stopping child process");
                if let Some(kill) = active.kill.take() {
                    // A closed channel means the task already finished.
                    let _ = kill.send(());
                }
            }
            if let Err(err) = (&mut active.handle).await {
                warn!(node = %self.spec.node, error = %err, "execution task join failed");
            }
        }
    }
}

impl ProcessActuator for ProcessExecutor {
    fn start(&mut self) {
        self.start_process();
    }

    fn stop<'a>(&'a mut self, reason: &str) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        let reason = reason.to_string();
        let this = self.clone();
        Box::pin(async move { this.stop_process(&reason).await })
    }
}

/// The execution task: timestamps, state transitions, spawn, output relay,
/// terminal outcome.
async fn run_child(
    client: &CoordClient,
    spec: &ProcessSpec,
    mut kill_rx: oneshot::Receiver<()>,
) -> Result<()> {
    let state_path = spec.sub_node(SUFFIX_STATE);

    client
        .set_data(&spec.sub_node(SUFFIX_TIMESTAMP_START), &wall_clock_now())
        .await?;
    client.set_data(&state_path, STATE_IN_PROGRESS).await?;

    info!(process = %spec.cmd, args = %spec.args, node = %spec.node, "launching child process");

    // Arguments are split on whitespace; quoting is not supported by the
    // descriptor format (inherited limitation).
    let mut cmd = Command::new(&spec.cmd);
    cmd.args(spec.args.split_whitespace())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning child process '{}'", spec.cmd))?;

    // Live relay: each completed output line is written to /StateInfo as it
    // appears, stdout and stderr independently. Interleaving is acceptable;
    // the tree keeps the last writer.
    spawn_relay(client.clone(), spec.clone(), child.stdout.take());
    spawn_relay(client.clone(), spec.clone(), child.stderr.take());

    let exit_code = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => status.code().unwrap_or(1),
            Err(err) => {
                warn!(process = %spec.cmd, error = %err, "wait for child interrupted");
                1
            }
        },
        _ = &mut kill_rx => {
            if let Err(err) = child.kill().await {
                warn!(process = %spec.cmd, error = %err, "failed to kill child process");
            }
            1
        }
    };

    client
        .set_data(&spec.sub_node(SUFFIX_TIMESTAMP_END), &wall_clock_now())
        .await?;

    if exit_code == 0 {
        info!(process = %spec.cmd, node = %spec.node, "child process succeeded");
        client.set_data(&state_path, STATE_SUCCESS).await?;
    } else {
        error!(process = %spec.cmd, node = %spec.node, exit_code, "child process failed");
        client.set_data(&state_path, STATE_ERROR).await?;
        // A single failure cascades into a fleet-wide abort signal.
        client.set_data(MASTER_STATE_PATH, MASTER_STOP).await?;
    }

    Ok(())
}

/// Drain one output stream line-by-line into `/StateInfo`.
fn spawn_relay(
    client: CoordClient,
    spec: ProcessSpec,
    stream: Option<impl AsyncRead + Unpin + Send + 'static>,
) {
    let Some(stream) = stream else { return };
    tokio::spawn(async move {
        let info_path = paths::sub_node(&spec.node, SUFFIX_STATE_INFO);
        let reader = BufReader::new(stream);
        let mut lines = reader.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            // Blank lines are not relayed.
            if line.is_empty() {
                continue;
            }
            if let Err(err) = client.set_data(&info_path, &line).await {
                warn!(node = %info_path, error = %err, "failed to relay output line");
            }
        }
    });
}
