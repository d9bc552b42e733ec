//! Configuration provider subsystem.
//!
//! # Data Flow
//! ```text
//! Refresh() trigger (admin endpoint, timer, operator)
//!     → sync.rs (traverse topology, assemble snapshot)
//!     → snapshot.rs SnapshotStore (atomic swap + fire old change token)
//!     → GetCurrent() readers observe the new snapshot lock-free
//! ```
//!
//! # Design Decisions
//! - `current()` never blocks and never fails; before the first successful
//!   refresh it returns the empty boot snapshot
//! - A failed cycle publishes nothing: the previous snapshot stays current
//!   and the failure is reported to the caller, never swallowed
//! - Overlapping refreshes are rejected with `Busy` (try_lock on a gate)
//!   so exactly one cycle ever owns a publish

pub mod snapshot;
pub mod sync;

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::observability::metrics;
use crate::topology::{InvalidServiceName, TopologyClient, TopologyError};

pub use snapshot::{ChangeToken, ConfigSnapshot, SnapshotStore};
pub use sync::{build_snapshot, SyncOptions};

/// Why a refresh cycle did not publish.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Another refresh cycle is already in flight.
    #[error("a refresh cycle is already in flight")]
    Busy,

    /// A topology query failed; the hierarchy below it cannot be discovered.
    #[error("synchronization aborted before publish: {0}")]
    Aborted(#[from] TopologyError),

    /// A discovered service name cannot participate in path routing.
    #[error("synchronization aborted before publish: {0}")]
    InvalidServiceName(#[from] InvalidServiceName),
}

/// Public surface the hosting/proxy layer consumes.
pub struct ConfigProvider {
    client: Arc<dyn TopologyClient>,
    store: SnapshotStore,
    options: SyncOptions,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl ConfigProvider {
    pub fn new(client: Arc<dyn TopologyClient>, options: SyncOptions) -> Self {
        Self {
            client,
            store: SnapshotStore::new(),
            options,
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// The most recently published snapshot. Non-blocking; returns the empty
    /// boot snapshot until the first refresh succeeds.
    pub fn current(&self) -> Arc<ConfigSnapshot> {
        self.store.current()
    }

    /// Run one full synchronization cycle and publish its result.
    ///
    /// On any unrecovered traversal failure the previous snapshot remains
    /// current and the error is returned. A concurrent call while a cycle is
    /// in flight reports [`RefreshError::Busy`].
    pub async fn refresh(&self) -> Result<Arc<ConfigSnapshot>, RefreshError> {
        let _gate = self
            .refresh_gate
            .try_lock()
            .map_err(|_| RefreshError::Busy)?;

        let started = Instant::now();
        match build_snapshot(self.client.as_ref(), &self.options).await {
            Ok(snapshot) => {
                let current = self.store.publish(snapshot);
                metrics::record_refresh("ok", started.elapsed());
                metrics::record_snapshot(current.routes.len(), current.clusters.len());
                tracing::info!(
                    version = current.version,
                    routes = current.routes.len(),
                    clusters = current.clusters.len(),
                    "configuration snapshot published"
                );
                Ok(current)
            }
            Err(error) => {
                metrics::record_refresh("aborted", started.elapsed());
                tracing::error!(
                    %error,
                    current_version = self.store.current().version,
                    "refresh aborted; previous snapshot remains current"
                );
                Err(error)
            }
        }
    }
}
