// src/coord/client.rs

//! Retrying client wrapper shared by every coordinator on a machine.
//!
//! Wraps one [`CoordinationService`] session and provides:
//!
//! - `ensure_path_exists` / `set_data` / `get_data` with bounded linear-backoff
//!   retry on transient connection loss
//! - a fan-out dispatcher that broadcasts every raw session event to all
//!   registered watchers, preserving per-watcher delivery order

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, warn};

use crate::coord::service::{
    CoordError, CoordResult, CoordinationService, SessionEvent,
};

/// Retry budget for transient connectivity failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts per operation.
    pub attempts: u32,
    /// Backoff between attempts is `attempt_index * base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Shared coordination client: one underlying session, many watchers.
#[derive(Clone)]
pub struct CoordClient {
    service: Arc<dyn CoordinationService>,
    retry: RetryConfig,
    watchers: Arc<Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>>,
}

impl CoordClient {
    pub fn new(service: Arc<dyn CoordinationService>) -> Self {
        Self::with_retry(service, RetryConfig::default())
    }

    pub fn with_retry(service: Arc<dyn CoordinationService>, retry: RetryConfig) -> Self {
        let watchers: Arc<Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>> =
            Arc::new(Mutex::new(Vec::new()));
        spawn_dispatcher(service.subscribe(), Arc::clone(&watchers));
        Self {
            service,
            retry,
            watchers,
        }
    }

    /// Register a watcher for raw session events. Every event received after
    /// registration is delivered in order; there is no ordering guarantee
    /// *across* watchers.
    pub fn register_watcher(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.lock().unwrap().push(tx);
        rx
    }

    /// Existence check that also arms a one-shot watch. Transient connection
    /// loss is retried like any other operation; every attempt re-arms the
    /// watch, which is idempotent.
    pub async fn exists_watch(&self, path: &str) -> CoordResult<bool> {
        let service = Arc::clone(&self.service);
        let path = path.to_string();
        self.retry(move || {
            let service = Arc::clone(&service);
            let path = path.clone();
            async move { service.exists(&path, true).await }
        })
        .await
    }

    /// Create every missing segment of a '/'-delimited path as an empty node.
    /// Idempotent; segments that already exist are left untouched.
    pub async fn ensure_path_exists(&self, path: &str) -> CoordResult<()> {
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);
            self.ensure_node(&current).await?;
        }
        Ok(())
    }

    /// Create the leaf with the given payload if absent, or overwrite it if
    /// present (last-writer-wins, no version check). The parent path is
    /// created first.
    pub async fn set_data(&self, path: &str, data: &str) -> CoordResult<()> {
        debug!(node = %path, data = %data, "setting node data");
        if let Some((parent, _)) = path.rsplit_once('/') {
            if !parent.is_empty() {
                self.ensure_path_exists(parent).await?;
            }
        }
        let service = Arc::clone(&self.service);
        let path = path.to_string();
        let data = data.to_string();
        self.retry(move || {
            let service = Arc::clone(&service);
            let path = path.clone();
            let data = data.clone();
            async move {
                if service.exists(&path, false).await? {
                    service.set(&path, data).await
                } else {
                    match service.create(&path, data).await {
                        // Lost a create race; the other writer's payload wins.
                        Err(CoordError::NodeExists(_)) => Ok(()),
                        other => other,
                    }
                }
            }
        })
        .await
    }

    /// Best-effort read: an absent node or any failure yields an empty string.
    /// Dependency evaluation treats "no data yet" as a valid transient state.
    pub async fn get_data(&self, path: &str) -> String {
        match self.try_get(path).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(node = %path, "no node yet");
                String::new()
            }
            Err(err) => {
                error!(node = %path, error = %err, "error reading node data");
                String::new()
            }
        }
    }

    async fn try_get(&self, path: &str) -> CoordResult<Option<String>> {
        if !self.service.exists(path, false).await? {
            return Ok(None);
        }
        self.service.get(path).await
    }

    async fn ensure_node(&self, path: &str) -> CoordResult<()> {
        let service = Arc::clone(&self.service);
        let path = path.to_string();
        self.retry(move || {
            let service = Arc::clone(&service);
            let path = path.clone();
            async move {
                if service.exists(&path, false).await? {
                    return Ok(());
                }
                match service.create(&path, String::new()).await {
                    Err(CoordError::NodeExists(_)) => Ok(()),
                    other => other,
                }
            }
        })
        .await
    }

    /// Re-issue `op` on transient connection loss, sleeping
    /// `attempt * base_delay` between attempts. Fatal session errors are never
    /// retried; after the budget is exhausted the last transient error
    /// propagates.
    async fn retry<T, F, Fut>(&self, mut op: F) -> CoordResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CoordResult<T>>,
    {
        let mut last_err = CoordError::ConnectionLoss;
        for attempt in 0..self.retry.attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry.base_delay * attempt).await;
            }
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    debug!(attempt, error = %err, "transient coordination failure; retrying");
                    last_err = err;
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err)
    }
}

fn spawn_dispatcher(
    mut rx: broadcast::Receiver<SessionEvent>,
    watchers: Arc<Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>>,
) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    // Drop watchers whose receiving end has gone away.
                    watchers
                        .lock()
                        .unwrap()
                        .retain(|tx| tx.send(event.clone()).is_ok());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session event dispatcher lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("session event dispatcher finished");
    });
}
