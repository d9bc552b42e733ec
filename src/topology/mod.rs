//! Topology discovery subsystem.
//!
//! # Data Flow
//! ```text
//! cluster manager (native driver or REST endpoint)
//!     → TopologyClient binding (rest.rs / native.rs)
//!     → pager.rs (follow continuation tokens)
//!     → ApplicationRef / ServiceRef / PartitionRef / ReplicaRef
//!     → address.rs (replica address payload → endpoints)
//! ```
//!
//! # Design Decisions
//! - One `TopologyClient` contract, two transports; the synchronizer never
//!   knows which binding is active
//! - The trait is object-safe (BoxFuture methods) so the provider can hold
//!   `Arc<dyn TopologyClient>` selected at startup
//! - Query failures carry the hierarchy level and the parent identifier so a
//!   failed refresh names the node that could not be enumerated

pub mod address;
pub mod native;
pub mod pager;
pub mod rest;

use std::fmt;

use futures_util::future::BoxFuture;
use thiserror::Error;

use self::pager::{drain_pages, Page};

/// URI scheme prefix the cluster manager puts on application/service names.
pub const NAME_SCHEME_PREFIX: &str = "fabric:/";

/// Strip the cluster URI scheme from a name, leaving the path form.
pub(crate) fn strip_scheme(name: &str) -> &str {
    name.strip_prefix(NAME_SCHEME_PREFIX).unwrap_or(name)
}

/// A deployed application, valid for one synchronization cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRef {
    /// Full name, e.g. `fabric:/App1`.
    pub name: String,
    /// URL-path form, e.g. `App1`.
    pub id: String,
}

/// A service within an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef {
    /// Full name, e.g. `fabric:/App1/Svc1`.
    pub name: String,
    /// URL-path form, e.g. `App1/Svc1`.
    pub id: String,
}

/// A partition within a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRef {
    pub id: String,
}

/// A replica (or stateless instance) within a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaRef {
    pub id: String,
    /// Raw address payload: a JSON object mapping listener name → URL.
    pub address: String,
}

/// Normalized service name: the full URI with the scheme prefix stripped.
///
/// Used directly as cluster id, route id prefix, and URL path match, so the
/// constructor enforces that it is non-empty and path-safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ServiceName(String);

/// A service name that cannot participate in path matching.
#[derive(Debug, Clone, Error)]
#[error("service name {raw:?} is not routable: {reason}")]
pub struct InvalidServiceName {
    pub raw: String,
    pub reason: &'static str,
}

impl ServiceName {
    pub fn normalize(raw: &str) -> Result<Self, InvalidServiceName> {
        let invalid = |reason| InvalidServiceName {
            raw: raw.to_string(),
            reason,
        };
        let stripped = strip_scheme(raw);
        if stripped.is_empty() {
            return Err(invalid("empty after removing the scheme prefix"));
        }
        if stripped.starts_with('/') {
            return Err(invalid("starts with a path separator"));
        }
        if stripped
            .chars()
            .any(|c| c.is_whitespace() || c == '?' || c == '#')
        {
            return Err(invalid("contains characters unsafe in a path match"));
        }
        Ok(Self(stripped.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which level of the topology hierarchy a query targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLevel {
    Applications,
    Services,
    Partitions,
    Replicas,
}

impl fmt::Display for QueryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryLevel::Applications => "applications",
            QueryLevel::Services => "services",
            QueryLevel::Partitions => "partitions",
            QueryLevel::Replicas => "replicas",
        };
        f.write_str(name)
    }
}

/// Transport or decode failure at a specific level of the hierarchy.
#[derive(Debug)]
pub struct TopologyError {
    pub level: QueryLevel,
    /// Identifier of the parent node whose children could not be listed.
    pub parent: Option<String>,
    pub kind: QueryErrorKind,
}

impl TopologyError {
    pub fn new(level: QueryLevel, parent: Option<String>, kind: QueryErrorKind) -> Self {
        Self {
            level,
            parent,
            kind,
        }
    }
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{} query under {parent:?} failed: {}", self.level, self.kind),
            None => write!(f, "{} query failed: {}", self.level, self.kind),
        }
    }
}

impl std::error::Error for TopologyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// What went wrong underneath a [`TopologyError`].
#[derive(Debug, Error)]
pub enum QueryErrorKind {
    /// Network-level failure or non-success status from the REST endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected envelope.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The native cluster-management driver reported a failure.
    #[error("driver error: {0}")]
    Driver(String),
}

/// The four paginated queries every topology transport must answer.
///
/// Each method fetches a single page; the `list_*` helpers below drain a
/// query to completion through the pagination cursor.
pub trait TopologyClient: Send + Sync {
    fn applications<'a>(
        &'a self,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ApplicationRef>, TopologyError>>;

    fn services<'a>(
        &'a self,
        app: &'a ApplicationRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ServiceRef>, TopologyError>>;

    fn partitions<'a>(
        &'a self,
        app: &'a ApplicationRef,
        service: &'a ServiceRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<PartitionRef>, TopologyError>>;

    fn replicas<'a>(
        &'a self,
        app: &'a ApplicationRef,
        service: &'a ServiceRef,
        partition: &'a PartitionRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ReplicaRef>, TopologyError>>;
}

pub async fn list_applications(
    client: &dyn TopologyClient,
) -> Result<Vec<ApplicationRef>, TopologyError> {
    drain_pages(|token| async move { client.applications(token.as_deref()).await }).await
}

pub async fn list_services(
    client: &dyn TopologyClient,
    app: &ApplicationRef,
) -> Result<Vec<ServiceRef>, TopologyError> {
    drain_pages(|token| async move { client.services(app, token.as_deref()).await }).await
}

pub async fn list_partitions(
    client: &dyn TopologyClient,
    app: &ApplicationRef,
    service: &ServiceRef,
) -> Result<Vec<PartitionRef>, TopologyError> {
    drain_pages(|token| async move { client.partitions(app, service, token.as_deref()).await })
        .await
}

pub async fn list_replicas(
    client: &dyn TopologyClient,
    app: &ApplicationRef,
    service: &ServiceRef,
    partition: &PartitionRef,
) -> Result<Vec<ReplicaRef>, TopologyError> {
    drain_pages(|token| async move {
        client.replicas(app, service, partition, token.as_deref()).await
    })
    .await
}
