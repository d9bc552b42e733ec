//! Native cluster-management binding for the topology client.
//!
//! # Responsibilities
//! - Adapt a native cluster-management driver to the `TopologyClient` contract
//! - Project the driver's richer query items onto the transport-neutral refs
//! - Map driver failures into the shared error taxonomy with level + parent
//!
//! # Design Decisions
//! - There is no registry crate for the native cluster API, so the driver
//!   itself is an injection seam: hosts embedding this crate implement
//!   `ClusterQuery` over their driver and hand it in
//! - `ClusterQuery` is deliberately raw (string parents, driver-shaped
//!   items); pagination, normalization, and error context all live on this
//!   side of the seam

use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

use super::pager::Page;
use super::{
    strip_scheme, ApplicationRef, PartitionRef, QueryErrorKind, QueryLevel, ReplicaRef,
    ServiceRef, TopologyClient, TopologyError,
};

/// One page of raw results from the native driver.
#[derive(Debug, Clone)]
pub struct DriverPage<T> {
    pub items: Vec<T>,
    pub continuation_token: Option<String>,
}

/// An application as the native query manager reports it.
#[derive(Debug, Clone)]
pub struct DriverApplication {
    pub name: String,
    pub type_name: String,
    pub status: String,
}

/// A service as the native query manager reports it.
#[derive(Debug, Clone)]
pub struct DriverService {
    pub name: String,
    pub type_name: String,
    pub status: String,
}

/// A partition as the native query manager reports it.
#[derive(Debug, Clone)]
pub struct DriverPartition {
    pub id: String,
    pub status: String,
}

/// A replica as the native query manager reports it.
#[derive(Debug, Clone)]
pub struct DriverReplica {
    pub id: String,
    pub address: String,
    pub node_name: String,
}

/// Failure reported by the native driver.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

/// Raw paged query surface of a native cluster-management driver.
pub trait ClusterQuery: Send + Sync {
    fn query_applications<'a>(
        &'a self,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<DriverPage<DriverApplication>, DriverError>>;

    fn query_services<'a>(
        &'a self,
        application_name: &'a str,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<DriverPage<DriverService>, DriverError>>;

    fn query_partitions<'a>(
        &'a self,
        service_name: &'a str,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<DriverPage<DriverPartition>, DriverError>>;

    fn query_replicas<'a>(
        &'a self,
        partition_id: &'a str,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<DriverPage<DriverReplica>, DriverError>>;
}

/// Topology client backed by a native cluster-management driver.
pub struct NativeTopologyClient {
    driver: Arc<dyn ClusterQuery>,
}

impl NativeTopologyClient {
    pub fn new(driver: Arc<dyn ClusterQuery>) -> Self {
        Self { driver }
    }
}

fn driver_failure(level: QueryLevel, parent: Option<String>, error: DriverError) -> TopologyError {
    TopologyError::new(level, parent, QueryErrorKind::Driver(error.0))
}

impl TopologyClient for NativeTopologyClient {
    fn applications<'a>(
        &'a self,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ApplicationRef>, TopologyError>> {
        Box::pin(async move {
            let page = self
                .driver
                .query_applications(token)
                .await
                .map_err(|e| driver_failure(QueryLevel::Applications, None, e))?;
            Ok(Page {
                items: page
                    .items
                    .into_iter()
                    .map(|app| ApplicationRef {
                        id: strip_scheme(&app.name).to_string(),
                        name: app.name,
                    })
                    .collect(),
                continuation_token: page.continuation_token,
            })
        })
    }

    fn services<'a>(
        &'a self,
        app: &'a ApplicationRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ServiceRef>, TopologyError>> {
        Box::pin(async move {
            let page = self
                .driver
                .query_services(&app.name, token)
                .await
                .map_err(|e| driver_failure(QueryLevel::Services, Some(app.name.clone()), e))?;
            Ok(Page {
                items: page
                    .items
                    .into_iter()
                    .map(|service| ServiceRef {
                        id: strip_scheme(&service.name).to_string(),
                        name: service.name,
                    })
                    .collect(),
                continuation_token: page.continuation_token,
            })
        })
    }

    fn partitions<'a>(
        &'a self,
        _app: &'a ApplicationRef,
        service: &'a ServiceRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<PartitionRef>, TopologyError>> {
        Box::pin(async move {
            let page = self
                .driver
                .query_partitions(&service.name, token)
                .await
                .map_err(|e| {
                    driver_failure(QueryLevel::Partitions, Some(service.name.clone()), e)
                })?;
            Ok(Page {
                items: page
                    .items
                    .into_iter()
                    .map(|partition| PartitionRef { id: partition.id })
                    .collect(),
                continuation_token: page.continuation_token,
            })
        })
    }

    fn replicas<'a>(
        &'a self,
        _app: &'a ApplicationRef,
        _service: &'a ServiceRef,
        partition: &'a PartitionRef,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Page<ReplicaRef>, TopologyError>> {
        Box::pin(async move {
            let page = self
                .driver
                .query_replicas(&partition.id, token)
                .await
                .map_err(|e| driver_failure(QueryLevel::Replicas, Some(partition.id.clone()), e))?;
            Ok(Page {
                items: page
                    .items
                    .into_iter()
                    .map(|replica| ReplicaRef {
                        id: replica.id,
                        address: replica.address,
                    })
                    .collect(),
                continuation_token: page.continuation_token,
            })
        })
    }
}
