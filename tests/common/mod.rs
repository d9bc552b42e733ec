//! Shared utilities for integration testing: an in-process mock of the
//! cluster manager's REST API with programmable topology, paging, and
//! failure injection.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct MockReplica {
    pub id: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct MockPartition {
    pub id: String,
    pub replicas: Vec<MockReplica>,
}

#[derive(Debug, Clone)]
pub struct MockService {
    /// Full name, e.g. `fabric:/App1/Svc1`.
    pub name: String,
    pub partitions: Vec<MockPartition>,
}

#[derive(Debug, Clone)]
pub struct MockApp {
    /// Full name, e.g. `fabric:/App1`.
    pub name: String,
    pub services: Vec<MockService>,
}

/// Programmable topology served over the REST wire format.
pub struct MockCluster {
    apps: Mutex<Vec<MockApp>>,
    /// Items per page; 0 serves everything in one page.
    page_size: AtomicUsize,
    /// Service names whose partition query answers 500.
    failing_partition_queries: Mutex<HashSet<String>>,
    /// Artificial latency on replica queries, in milliseconds.
    replica_delay_ms: AtomicU64,
}

#[allow(dead_code)]
impl MockCluster {
    pub fn new(apps: Vec<MockApp>) -> Arc<Self> {
        Arc::new(Self {
            apps: Mutex::new(apps),
            page_size: AtomicUsize::new(0),
            failing_partition_queries: Mutex::new(HashSet::new()),
            replica_delay_ms: AtomicU64::new(0),
        })
    }

    pub fn set_apps(&self, apps: Vec<MockApp>) {
        *self.apps.lock().unwrap() = apps;
    }

    pub fn set_page_size(&self, size: usize) {
        self.page_size.store(size, Ordering::SeqCst);
    }

    pub fn fail_partition_queries_for(&self, service_name: &str) {
        self.failing_partition_queries
            .lock()
            .unwrap()
            .insert(service_name.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_partition_queries.lock().unwrap().clear();
    }

    pub fn set_replica_delay(&self, delay: Duration) {
        self.replica_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn strip(name: &str) -> &str {
        name.strip_prefix("fabric:/").unwrap_or(name)
    }

    fn find_app(&self, app_id: &str) -> Option<MockApp> {
        self.apps
            .lock()
            .unwrap()
            .iter()
            .find(|a| Self::strip(&a.name) == app_id)
            .cloned()
    }

    fn find_service(&self, app_id: &str, service_id: &str) -> Option<MockService> {
        self.find_app(app_id)?
            .services
            .into_iter()
            .find(|s| Self::strip(&s.name) == service_id)
    }

    fn page(&self, items: Vec<Value>, token: Option<&str>) -> Value {
        let page_size = self.page_size.load(Ordering::SeqCst);
        let start: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = if page_size == 0 {
            items.len()
        } else {
            (start + page_size).min(items.len())
        };
        // The real endpoint reports the last page with an empty token.
        let next = if end < items.len() {
            end.to_string()
        } else {
            String::new()
        };
        json!({
            "ContinuationToken": next,
            "Items": items.get(start..end).unwrap_or(&[]),
        })
    }
}

fn token(params: &HashMap<String, String>) -> Option<&str> {
    params.get("ContinuationToken").map(|s| s.as_str())
}

async fn list_applications(
    State(cluster): State<Arc<MockCluster>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let items: Vec<Value> = cluster
        .apps
        .lock()
        .unwrap()
        .iter()
        .map(|app| {
            json!({
                "Name": app.name,
                "TypeName": format!("{}Type", MockCluster::strip(&app.name)),
                "Status": "Ready",
                "Id": MockCluster::strip(&app.name),
            })
        })
        .collect();
    Json(cluster.page(items, token(&params)))
}

async fn list_services(
    State(cluster): State<Arc<MockCluster>>,
    Path(app_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(app) = cluster.find_app(&app_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let items: Vec<Value> = app
        .services
        .iter()
        .map(|service| {
            json!({
                "ServiceKind": "Stateless",
                "Name": service.name,
                "Id": MockCluster::strip(&service.name),
                "HealthState": "Ok",
            })
        })
        .collect();
    Json(cluster.page(items, token(&params))).into_response()
}

/// Dispatches `{service}/$/GetPartitions` and
/// `{service}/$/GetPartitions/{partition}/$/GetReplicas`; the service id
/// itself spans path segments, so a wildcard capture is parsed by hand.
async fn service_subtree(
    State(cluster): State<Arc<MockCluster>>,
    Path((app_id, tail)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rest) = tail.strip_suffix("/$/GetReplicas") {
        let Some((service_id, partition_id)) = rest.split_once("/$/GetPartitions/") else {
            return StatusCode::NOT_FOUND.into_response();
        };
        return list_replicas(&cluster, &app_id, service_id, partition_id, &params).await;
    }
    if let Some(service_id) = tail.strip_suffix("/$/GetPartitions") {
        return list_partitions(&cluster, &app_id, service_id, &params);
    }
    StatusCode::NOT_FOUND.into_response()
}

fn list_partitions(
    cluster: &MockCluster,
    app_id: &str,
    service_id: &str,
    params: &HashMap<String, String>,
) -> Response {
    let Some(service) = cluster.find_service(app_id, service_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if cluster
        .failing_partition_queries
        .lock()
        .unwrap()
        .contains(&service.name)
    {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let items: Vec<Value> = service
        .partitions
        .iter()
        .map(|partition| {
            json!({
                "ServiceKind": "Stateless",
                "PartitionInformation": {
                    "ServicePartitionKind": "Singleton",
                    "Id": partition.id,
                },
                "PartitionStatus": "Ready",
            })
        })
        .collect();
    Json(cluster.page(items, token(params))).into_response()
}

async fn list_replicas(
    cluster: &MockCluster,
    app_id: &str,
    service_id: &str,
    partition_id: &str,
    params: &HashMap<String, String>,
) -> Response {
    let delay = cluster.replica_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let Some(service) = cluster.find_service(app_id, service_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(partition) = service.partitions.iter().find(|p| p.id == partition_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let items: Vec<Value> = partition
        .replicas
        .iter()
        .map(|replica| {
            json!({
                "ServiceKind": "Stateless",
                "InstanceId": replica.id,
                "ReplicaStatus": "Ready",
                "Address": replica.address,
                "NodeName": "node-0",
            })
        })
        .collect();
    Json(cluster.page(items, token(params))).into_response()
}

/// Serve the mock on an ephemeral local port.
pub async fn serve(cluster: Arc<MockCluster>) -> SocketAddr {
    let app = Router::new()
        .route("/Applications", get(list_applications))
        .route("/Applications/{app}/$/GetServices", get(list_services))
        .route(
            "/Applications/{app}/$/GetServices/{*tail}",
            get(service_subtree),
        )
        .with_state(cluster);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// One application, one service, one partition with the given replicas.
#[allow(dead_code)]
pub fn single_service_topology(
    app: &str,
    service: &str,
    replicas: Vec<(&str, &str)>,
) -> Vec<MockApp> {
    vec![MockApp {
        name: format!("fabric:/{app}"),
        services: vec![MockService {
            name: format!("fabric:/{service}"),
            partitions: vec![MockPartition {
                id: "p1".to_string(),
                replicas: replicas
                    .into_iter()
                    .map(|(id, address)| MockReplica {
                        id: id.to_string(),
                        address: address.to_string(),
                    })
                    .collect(),
            }],
        }],
    }]
}
