// src/coord/memory.rs

//! Process-local in-memory coordination backend (`mem://`).
//!
//! One [`MemoryTree`] is the shared blackboard; each [`MemoryCoordination`]
//! obtained from it is an independent session with its own one-shot watch set
//! and event stream. Used by tests, demos, and single-machine runs; a real
//! ensemble backend plugs in behind the same [`CoordinationService`] trait.
//!
//! Sessions also carry small test hooks: an operation counter, transient
//! fault injection, and explicit session expiry.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::debug;

use crate::coord::service::{
    CoordError, CoordResult, CoordinationService, ServiceFuture, SessionEvent, SessionState,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The shared hierarchical key/value store backing every session.
#[derive(Clone, Default)]
pub struct MemoryTree {
    inner: Arc<Mutex<TreeInner>>,
}

#[derive(Default)]
struct TreeInner {
    nodes: BTreeMap<String, String>,
    sessions: Vec<Arc<SessionShared>>,
}

struct SessionShared {
    watches: Mutex<HashSet<String>>,
    events: broadcast::Sender<SessionEvent>,
    expired: AtomicBool,
    op_count: AtomicUsize,
    fail_next: AtomicUsize,
}

impl SessionShared {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            watches: Mutex::new(HashSet::new()),
            events,
            expired: AtomicBool::new(false),
            op_count: AtomicUsize::new(0),
            fail_next: AtomicUsize::new(0),
        }
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session on this tree.
    pub fn session(&self) -> MemoryCoordination {
        let shared = Arc::new(SessionShared::new());
        self.inner.lock().unwrap().sessions.push(Arc::clone(&shared));
        MemoryCoordination {
            tree: self.clone(),
            shared,
        }
    }

    /// Read a node's payload directly, bypassing any session (test helper).
    pub fn read(&self, path: &str) -> Option<String> {
        self.inner.lock().unwrap().nodes.get(path).cloned()
    }

    /// All node paths currently in the tree, in order (test helper).
    pub fn paths(&self) -> Vec<String> {
        self.inner.lock().unwrap().nodes.keys().cloned().collect()
    }

    /// Create or overwrite a node directly, firing armed watches on every
    /// live session (test helper standing in for "another machine wrote").
    pub fn write(&self, path: &str, data: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.nodes.insert(path.to_string(), data.to_string());
        fire_watches(&inner, path);
    }
}

fn fire_watches(inner: &TreeInner, path: &str) {
    for session in &inner.sessions {
        if session.expired.load(Ordering::SeqCst) {
            continue;
        }
        if session.watches.lock().unwrap().remove(path) {
            let _ = session.events.send(SessionEvent::NodeChanged {
                path: path.to_string(),
            });
        }
    }
}

/// One session on a [`MemoryTree`].
#[derive(Clone)]
pub struct MemoryCoordination {
    tree: MemoryTree,
    shared: Arc<SessionShared>,
}

impl MemoryCoordination {
    /// Number of raw operations issued on this session, failed ones included.
    pub fn op_count(&self) -> usize {
        self.shared.op_count.load(Ordering::SeqCst)
    }

    /// Make the next `n` operations fail with `ConnectionLoss`.
    pub fn fail_next(&self, n: usize) {
        self.shared.fail_next.store(n, Ordering::SeqCst);
    }

    /// Expire this session: all further operations fail with
    /// `SessionExpired` and a terminal state change is broadcast.
    pub fn expire(&self) {
        self.shared.expired.store(true, Ordering::SeqCst);
        let _ = self
            .shared
            .events
            .send(SessionEvent::StateChanged(SessionState::Expired));
    }

    fn guard(&self) -> CoordResult<()> {
        self.shared.op_count.fetch_add(1, Ordering::SeqCst);
        if self.shared.expired.load(Ordering::SeqCst) {
            return Err(CoordError::SessionExpired);
        }
        let remaining = self.shared.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.shared.fail_next.store(remaining - 1, Ordering::SeqCst);
            debug!(remaining = remaining - 1, "injected connection loss");
            return Err(CoordError::ConnectionLoss);
        }
        Ok(())
    }

    fn do_exists(&self, path: &str, watch: bool) -> CoordResult<bool> {
        self.guard()?;
        let inner = self.tree.inner.lock().unwrap();
        if watch {
            self.shared.watches.lock().unwrap().insert(path.to_string());
        }
        Ok(inner.nodes.contains_key(path))
    }

    fn do_get(&self, path: &str) -> CoordResult<Option<String>> {
        self.guard()?;
        Ok(self.tree.inner.lock().unwrap().nodes.get(path).cloned())
    }

    fn do_create(&self, path: &str, data: String) -> CoordResult<()> {
        self.guard()?;
        let mut inner = self.tree.inner.lock().unwrap();
        if inner.nodes.contains_key(path) {
            return Err(CoordError::NodeExists(path.to_string()));
        }
        inner.nodes.insert(path.to_string(), data);
        fire_watches(&inner, path);
        Ok(())
    }

    fn do_set(&self, path: &str, data: String) -> CoordResult<()> {
        self.guard()?;
        let mut inner = self.tree.inner.lock().unwrap();
        if !inner.nodes.contains_key(path) {
            return Err(CoordError::NoNode(path.to_string()));
        }
        inner.nodes.insert(path.to_string(), data);
        fire_watches(&inner, path);
        Ok(())
    }
}

impl CoordinationService for MemoryCoordination {
    fn exists<'a>(&'a self, path: &'a str, watch: bool) -> ServiceFuture<'a, bool> {
        let res = self.do_exists(path, watch);
        Box::pin(async move { res })
    }

    fn get<'a>(&'a self, path: &'a str) -> ServiceFuture<'a, Option<String>> {
        let res = self.do_get(path);
        Box::pin(async move { res })
    }

    fn create<'a>(&'a self, path: &'a str, data: String) -> ServiceFuture<'a, ()> {
        let res = self.do_create(path, data);
        Box::pin(async move { res })
    }

    fn set<'a>(&'a self, path: &'a str, data: String) -> ServiceFuture<'a, ()> {
        let res = self.do_set(path, data);
        Box::pin(async move { res })
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }
}
