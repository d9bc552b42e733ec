//! Topology-to-configuration synchronizer for a reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//! cluster manager (native driver / REST endpoint)
//!     │ paginated queries (apps → services → partitions → replicas)
//!     ▼
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────────┐
//! │ topology │──▶│ address  │──▶│ routing  │──▶│   provider    │
//! │ client + │   │ decoder  │   │ synth    │   │ build + atomic│
//! │ pager    │   │          │   │          │   │ swap publish  │
//! └──────────┘   └──────────┘   └──────────┘   └───────┬───────┘
//!                                                      │ GetCurrent /
//!                                                      │ change token
//!                                                      ▼
//!                                    proxy dispatch engine + admin surface
//! ```
//!
//! The proxy dispatch engine itself lives outside this crate: it reads the
//! published routes/clusters and re-reads them after the snapshot's change
//! token fires. Refresh is always externally triggered (admin endpoint or a
//! host-owned timer); nothing here polls on its own.

// Core subsystems
pub mod config;
pub mod provider;
pub mod routing;
pub mod topology;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::Settings;
pub use provider::{ConfigProvider, ConfigSnapshot, RefreshError, SyncOptions};
pub use topology::TopologyClient;
