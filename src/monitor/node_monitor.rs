// src/monitor/node_monitor.rs

//! Watches a fixed set of node paths on behalf of one coordinator.
//!
//! Watches are one-shot: every data-change notification is answered by an
//! explicit re-arm of the exists+watch request for that path. No server-side
//! replay of missed events is assumed. Payloads are deduplicated against a
//! per-path cache, so the listener sees exactly one event per distinct
//! observed payload, and nothing at all for "node not found".

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::coord::client::CoordClient;
use crate::coord::service::{CoordError, SessionEvent, SessionState};
use crate::monitor::{CloseReason, MonitorEvent};

/// How a single exists+watch request ended.
enum ArmOutcome {
    /// Armed, node absent, or the session died; nothing left to retry.
    Settled,
    /// Transient failure; the watch for this path is not armed.
    Transient,
}

/// One-shot-watch monitor over a fixed path set.
pub struct NodeMonitor {
    client: CoordClient,
    paths: Vec<String>,
    /// Last payload observed per path. A path absent from the cache has never
    /// been observed, which is distinct from an observed-but-empty payload.
    cache: HashMap<String, String>,
    listener: mpsc::UnboundedSender<MonitorEvent>,
    session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    dead: bool,
}

impl NodeMonitor {
    /// Register with the client's session-event dispatcher and build a
    /// monitor over `paths`. Watches are armed when [`run`](Self::run)
    /// starts.
    pub fn new(
        client: CoordClient,
        paths: Vec<String>,
        listener: mpsc::UnboundedSender<MonitorEvent>,
    ) -> Self {
        let session_rx = client.register_watcher();
        Self {
            client,
            paths,
            cache: HashMap::new(),
            listener,
            session_rx,
            dead: false,
        }
    }

    /// Drive the monitor until the session dies or the listener goes away.
    pub async fn run(mut self) {
        debug!(paths = ?self.paths, "node monitor starting");

        // Completely event driven from here on: arm a watch per path, then
        // react to session events.
        let initial: Vec<String> = self.paths.clone();
        for path in initial {
            self.check(&path).await;
            if self.dead {
                return;
            }
        }

        while !self.dead {
            match self.session_rx.recv().await {
                Some(event) => self.handle_session_event(event).await,
                None => break,
            }
        }

        debug!("node monitor finished");
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::StateChanged(SessionState::Connected)
            | SessionEvent::StateChanged(SessionState::Disconnected) => {
                // Watches survive reconnection; nothing to correct here.
            }
            SessionEvent::StateChanged(SessionState::Expired) => {
                warn!("the session has expired");
                self.die(CloseReason::SessionExpired);
            }
            SessionEvent::StateChanged(SessionState::NotAuthorized) => {
                warn!("the session is not authorized");
                self.die(CloseReason::NotAuthorized);
            }
            SessionEvent::NodeChanged { path } => {
                // One-shot watches: something changed on a tracked node, so
                // re-arm and resolve the new payload.
                if self.paths.iter().any(|p| p == &path) {
                    self.check(&path).await;
                }
            }
        }
    }

    /// Issue the exists+watch request for `path` and process its outcome. A
    /// transient failure re-issues the request for every tracked path,
    /// sweeping until each is armed; the monitor never leaves a path
    /// unwatched while the session is alive.
    async fn check(&mut self, path: &str) {
        if let ArmOutcome::Transient = self.arm(path).await {
            self.rearm_all().await;
        }
    }

    /// One exists+watch request plus payload resolution, no retry of its own
    /// beyond the client's budget.
    async fn arm(&mut self, path: &str) -> ArmOutcome {
        if self.dead {
            return ArmOutcome::Settled;
        }
        match self.client.exists_watch(path).await {
            Ok(true) => {
                let data = self.client.get_data(path).await;
                if self.cache.get(path) != Some(&data) {
                    info!(node = %path, data = %data, "node data changed; notifying listener");
                    self.cache.insert(path.to_string(), data.clone());
                    if self
                        .listener
                        .send(MonitorEvent::DataChanged {
                            path: path.to_string(),
                            data,
                        })
                        .is_err()
                    {
                        self.dead = true;
                    }
                }
                ArmOutcome::Settled
            }
            Ok(false) => {
                // Disappearance is not a signalled event; only existing
                // payloads reach the listener.
                debug!(node = %path, "node not found");
                ArmOutcome::Settled
            }
            Err(CoordError::SessionExpired) => {
                warn!(node = %path, "session expired");
                self.die(CloseReason::SessionExpired);
                ArmOutcome::Settled
            }
            Err(CoordError::NotAuthorized) => {
                warn!(node = %path, "not authorized");
                self.die(CloseReason::NotAuthorized);
                ArmOutcome::Settled
            }
            Err(err) => {
                debug!(node = %path, error = %err, "watch request failed");
                ArmOutcome::Transient
            }
        }
    }

    /// Broad retry: re-issue the exists+watch request for every tracked path,
    /// repeating the sweep while any request still fails transiently. Each
    /// request already carries the client's backoff budget, so the sweep
    /// sleeps rather than spins; a fatal error ends it through `die`.
    async fn rearm_all(&mut self) {
        while !self.dead {
            debug!(paths = self.paths.len(), "re-arming all watched paths");
            let mut transient = false;
            let all: Vec<String> = self.paths.clone();
            for p in all {
                if self.dead {
                    return;
                }
                if let ArmOutcome::Transient = self.arm(&p).await {
                    transient = true;
                }
            }
            if !transient {
                return;
            }
        }
    }

    fn die(&mut self, reason: CloseReason) {
        if self.dead {
            return;
        }
        self.dead = true;
        let _ = self.listener.send(MonitorEvent::Closing(reason));
    }
}
