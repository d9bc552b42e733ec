//! Topology traversal and snapshot assembly.
//!
//! # Responsibilities
//! - Walk applications → services → partitions → replicas through the
//!   transport-neutral client
//! - Decode replica addresses into per-service destination sets
//! - Synthesize routes/clusters and assemble a fresh `ConfigSnapshot`
//!
//! # Design Decisions
//! - Fan-out happens at the application/service level and again across a
//!   service's partitions; the limit is configurable, unbounded by default
//! - A replica whose address cannot be decoded is skipped with a warning;
//!   any topology query failure aborts the whole cycle
//! - Accumulators live only for the cycle and are dropped on failure, so an
//!   aborted build can never leak into the published snapshot
//! - Sibling ordering is not guaranteed: routes/clusters come out in
//!   completion order and consumers must treat them as sets

use std::collections::BTreeMap;
use std::sync::Mutex;

use dashmap::DashMap;
use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::routing::{synthesize, Cluster, Destination, Route};
use crate::topology::address::decode_replica_address;
use crate::topology::{
    list_applications, list_partitions, list_replicas, list_services, ApplicationRef,
    ServiceName, ServiceRef, TopologyClient,
};

use super::snapshot::ConfigSnapshot;
use super::RefreshError;

/// Knobs for one synchronization cycle.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Maximum concurrent branches at each fan-out point; `None` fans out
    /// fully and lets the transport's connection limits throttle.
    pub fanout: Option<usize>,
}

/// Run one full traversal and assemble an unpublished snapshot.
///
/// The returned future holds no locks across its lifetime and touches no
/// shared state, so callers may impose a deadline (`tokio::time::timeout`)
/// or drop it mid-flight without affecting the published configuration.
pub async fn build_snapshot(
    client: &dyn TopologyClient,
    options: &SyncOptions,
) -> Result<ConfigSnapshot, RefreshError> {
    let apps = list_applications(client).await?;
    tracing::debug!(applications = apps.len(), "topology traversal started");

    let clusters: Mutex<Vec<Cluster>> = Mutex::new(Vec::new());
    let routes: Mutex<Vec<Route>> = Mutex::new(Vec::new());
    let limit = options.fanout;

    stream::iter(&apps)
        .map(Ok::<&ApplicationRef, RefreshError>)
        .try_for_each_concurrent(limit, |app| {
            let clusters = &clusters;
            let routes = &routes;
            async move {
                let services = list_services(client, app).await?;
                stream::iter(services)
                    .map(Ok::<ServiceRef, RefreshError>)
                    .try_for_each_concurrent(limit, |service| async move {
                        sync_service(client, limit, app, &service, clusters, routes).await
                    })
                    .await
            }
        })
        .await?;

    Ok(ConfigSnapshot::new(
        routes.into_inner().expect("route accumulator poisoned"),
        clusters.into_inner().expect("cluster accumulator poisoned"),
    ))
}

/// Traverse one service's partitions and replicas, then synthesize its
/// cluster and routes into the cycle accumulators.
async fn sync_service(
    client: &dyn TopologyClient,
    limit: Option<usize>,
    app: &ApplicationRef,
    service: &ServiceRef,
    clusters: &Mutex<Vec<Cluster>>,
    routes: &Mutex<Vec<Route>>,
) -> Result<(), RefreshError> {
    let name = ServiceName::normalize(&service.name)?;
    let destinations: DashMap<String, Destination> = DashMap::new();

    let partitions = list_partitions(client, app, service).await?;
    stream::iter(&partitions)
        .map(Ok::<_, RefreshError>)
        .try_for_each_concurrent(limit, |partition| {
            let destinations = &destinations;
            let name = &name;
            async move {
                let replicas = list_replicas(client, app, service, partition).await?;
                for replica in &replicas {
                    match decode_replica_address(&replica.address) {
                        Ok(endpoints) => {
                            for (_listener, url) in endpoints {
                                destinations.insert(
                                    format!("{}:{}", partition.id, replica.id),
                                    Destination { address: url },
                                );
                            }
                        }
                        Err(error) => {
                            tracing::warn!(
                                service = %name,
                                partition = %partition.id,
                                replica = %replica.id,
                                %error,
                                "skipping replica with undecodable address"
                            );
                        }
                    }
                }
                Ok(())
            }
        })
        .await?;

    let destinations: BTreeMap<String, Destination> = destinations.into_iter().collect();
    let (cluster, service_routes) = synthesize(&name, destinations);
    tracing::debug!(
        service = %name,
        destinations = cluster.destinations.len(),
        "service synchronized"
    );

    clusters
        .lock()
        .expect("cluster accumulator poisoned")
        .push(cluster);
    routes
        .lock()
        .expect("route accumulator poisoned")
        .extend(service_routes);
    Ok(())
}
