//! Snapshot types and the atomic publish slot.
//!
//! # Responsibilities
//! - Immutable `ConfigSnapshot` (routes + clusters + change token)
//! - One-shot `ChangeToken` observers wait on
//! - `SnapshotStore`: the process-wide "current configuration" cell
//!
//! # Design Decisions
//! - The store is an owned value, not a static, so tests build independent
//!   instances; publishing is one `ArcSwap::swap`
//! - The replaced snapshot's token fires after the swap, so an observer that
//!   wakes and re-reads always sees the successor (or something newer)
//! - Versions are stamped by the store, monotonically; the boot snapshot is
//!   version 0 with no routes

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tokio::sync::Notify;

use crate::routing::{Cluster, Route};

/// One-shot supersession signal.
///
/// Fires at most once, when the snapshot holding it is replaced. Cloning
/// shares the underlying signal.
#[derive(Debug, Clone)]
pub struct ChangeToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug)]
struct TokenInner {
    fired: AtomicBool,
    notify: Notify,
}

impl ChangeToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                fired: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Signal supersession. Idempotent; only the first call wakes waiters.
    pub fn fire(&self) {
        if !self.inner.fired.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Non-blocking probe.
    pub fn has_changed(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }

    /// Wait until the token fires. Returns immediately if it already has.
    pub async fn changed(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register interest before checking the flag, so a fire() between
        // the check and the await cannot be missed.
        notified.as_mut().enable();
        if self.has_changed() {
            return;
        }
        notified.await;
    }
}

impl Default for ChangeToken {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable routing configuration produced by one synchronization cycle.
#[derive(Debug, Serialize)]
pub struct ConfigSnapshot {
    /// Monotonic publish sequence number; 0 is the empty boot snapshot.
    pub version: u64,
    pub routes: Vec<Route>,
    pub clusters: Vec<Cluster>,
    #[serde(skip)]
    change_token: ChangeToken,
}

impl ConfigSnapshot {
    /// The empty snapshot every process starts from.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// A snapshot awaiting publication; the store stamps the version.
    pub fn new(routes: Vec<Route>, clusters: Vec<Cluster>) -> Self {
        Self {
            version: 0,
            routes,
            clusters,
            change_token: ChangeToken::new(),
        }
    }

    /// Token that fires when this snapshot is superseded.
    pub fn change_token(&self) -> &ChangeToken {
        &self.change_token
    }
}

/// Atomic slot holding the currently published snapshot.
pub struct SnapshotStore {
    current: ArcSwap<ConfigSnapshot>,
    versions: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(ConfigSnapshot::empty()),
            versions: AtomicU64::new(0),
        }
    }

    /// Lock-free read of the current snapshot.
    pub fn current(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Stamp, swap in, and signal: the previous snapshot's change token
    /// fires after the new one is observable. Returns the new current.
    pub fn publish(&self, snapshot: ConfigSnapshot) -> Arc<ConfigSnapshot> {
        let mut snapshot = snapshot;
        snapshot.version = self.versions.fetch_add(1, Ordering::AcqRel) + 1;
        let next = Arc::new(snapshot);
        let previous = self.current.swap(Arc::clone(&next));
        previous.change_token().fire();
        next
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
