//! End-to-end synchronization cycles against a mock cluster manager served
//! over a real socket.

mod common;

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use fabric_sync::provider::{ConfigProvider, RefreshError, SyncOptions};
use fabric_sync::routing::{Cluster, ForwardedCall, Route, RouteTransform};
use fabric_sync::topology::rest::RestTopologyClient;

use common::{
    serve, single_service_topology, MockApp, MockCluster, MockPartition, MockReplica, MockService,
};

fn provider_for(addr: std::net::SocketAddr) -> Arc<ConfigProvider> {
    let base = Url::parse(&format!("http://{addr}")).unwrap();
    let client = RestTopologyClient::new(base, "3.0");
    Arc::new(ConfigProvider::new(Arc::new(client), SyncOptions::default()))
}

fn cluster_by_id<'a>(clusters: &'a [Cluster], id: &str) -> &'a Cluster {
    clusters
        .iter()
        .find(|c| c.id == id)
        .unwrap_or_else(|| panic!("no cluster {id}"))
}

fn route_by_id<'a>(routes: &'a [Route], id: &str) -> &'a Route {
    routes
        .iter()
        .find(|r| r.route_id == id)
        .unwrap_or_else(|| panic!("no route {id}"))
}

#[tokio::test]
async fn refresh_derives_routes_and_clusters_from_the_topology() {
    let topology = single_service_topology(
        "App1",
        "App1/Svc1",
        vec![
            ("1331", r#"{"Endpoints":{"":"http://h1:10"}}"#),
            ("1332", r#"{"Endpoints":{"":"http://h2:20"}}"#),
        ],
    );
    let addr = serve(MockCluster::new(topology)).await;
    let provider = provider_for(addr);

    let snapshot = provider.refresh().await.unwrap();
    assert_eq!(snapshot.version, 1);

    let cluster = cluster_by_id(&snapshot.clusters, "App1/Svc1");
    assert_eq!(cluster.destinations.len(), 2);
    assert_eq!(cluster.destinations["p1:1331"].address, "http://h1:10");
    assert_eq!(cluster.destinations["p1:1332"].address, "http://h2:20");

    let catch_all = route_by_id(&snapshot.routes, "App1/Svc1:catch-all");
    assert_eq!(catch_all.cluster_id, "App1/Svc1");
    assert_eq!(catch_all.path_match, "App1/Svc1/{**rest}");
    let root = route_by_id(&snapshot.routes, "App1/Svc1:root-match");
    assert_eq!(root.path_match, "App1/Svc1");

    // Both routes rewrite the call the same way.
    for route in [catch_all, root] {
        assert_eq!(
            route.transforms,
            vec![
                RouteTransform::PathRemovePrefix {
                    prefix: "/App1/Svc1".to_string(),
                },
                RouteTransform::RequestHeader {
                    name: "X-Forwarded-PathBase".to_string(),
                    value: "/App1/Svc1".to_string(),
                },
            ]
        );
    }

    let mut call = ForwardedCall::new("/App1/Svc1/api/items");
    catch_all.apply_transforms(&mut call);
    assert_eq!(call.path, "/api/items");
    assert_eq!(call.header("x-forwarded-pathbase"), Some("/App1/Svc1"));
}

#[tokio::test]
async fn traversal_drains_every_page_at_every_level() {
    let services = (1..=3)
        .map(|s| MockService {
            name: format!("fabric:/App1/Svc{s}"),
            partitions: (1..=2)
                .map(|p| MockPartition {
                    id: format!("s{s}p{p}"),
                    replicas: (1..=2)
                        .map(|r| MockReplica {
                            id: format!("{r}"),
                            // Identical URLs on purpose; the partition:replica
                            // key keeps every destination distinct.
                            address: r#"{"Endpoints":{"":"http://shared:9000"}}"#.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();
    let cluster = MockCluster::new(vec![MockApp {
        name: "fabric:/App1".to_string(),
        services,
    }]);
    cluster.set_page_size(1);
    let addr = serve(cluster).await;
    let provider = provider_for(addr);

    let snapshot = provider.refresh().await.unwrap();
    assert_eq!(snapshot.clusters.len(), 3);
    assert_eq!(snapshot.routes.len(), 6);
    for s in 1..=3 {
        let cluster = cluster_by_id(&snapshot.clusters, &format!("App1/Svc{s}"));
        assert_eq!(cluster.destinations.len(), 4);
        assert!(cluster.destinations.contains_key(&format!("s{s}p1:1")));
        assert!(cluster.destinations.contains_key(&format!("s{s}p2:2")));
    }
}

#[tokio::test]
async fn undecodable_replica_addresses_are_skipped_not_fatal() {
    let topology = single_service_topology(
        "App1",
        "App1/Svc1",
        vec![
            ("1331", "not json"),
            ("1332", r#"{"Endpoints":{}}"#),
            ("1333", r#"{"Endpoints":{"":"http://h3:30"}}"#),
        ],
    );
    let addr = serve(MockCluster::new(topology)).await;
    let provider = provider_for(addr);

    let snapshot = provider.refresh().await.unwrap();
    let cluster = cluster_by_id(&snapshot.clusters, "App1/Svc1");
    assert_eq!(cluster.destinations.len(), 1);
    assert_eq!(cluster.destinations["p1:1333"].address, "http://h3:30");
}

#[tokio::test]
async fn a_service_with_no_reachable_replicas_still_gets_routes() {
    let topology = vec![MockApp {
        name: "fabric:/App1".to_string(),
        services: vec![MockService {
            name: "fabric:/App1/Empty".to_string(),
            partitions: vec![],
        }],
    }];
    let addr = serve(MockCluster::new(topology)).await;
    let provider = provider_for(addr);

    let snapshot = provider.refresh().await.unwrap();
    let cluster = cluster_by_id(&snapshot.clusters, "App1/Empty");
    assert!(cluster.destinations.is_empty());
    assert_eq!(snapshot.routes.len(), 2);
}

#[tokio::test]
async fn mid_traversal_failure_keeps_the_previous_snapshot() {
    let cluster = MockCluster::new(single_service_topology(
        "App1",
        "App1/Svc1",
        vec![("1331", r#"{"Endpoints":{"":"http://h1:10"}}"#)],
    ));
    let addr = serve(Arc::clone(&cluster)).await;
    let provider = provider_for(addr);

    let baseline = provider.refresh().await.unwrap();
    assert_eq!(baseline.version, 1);

    cluster.fail_partition_queries_for("fabric:/App1/Svc1");
    let error = provider.refresh().await.unwrap_err();
    assert!(matches!(error, RefreshError::Aborted(_)));

    // Readers still see the last good snapshot, untouched.
    let current = provider.current();
    assert_eq!(current.version, 1);
    assert_eq!(current.clusters.len(), 1);

    cluster.clear_failures();
    let recovered = provider.refresh().await.unwrap();
    assert_eq!(recovered.version, 2);
}

#[tokio::test]
async fn publishing_fires_the_superseded_snapshot_token_exactly_once() {
    let cluster = MockCluster::new(single_service_topology(
        "App1",
        "App1/Svc1",
        vec![("1331", r#"{"Endpoints":{"":"http://h1:10"}}"#)],
    ));
    let addr = serve(cluster).await;
    let provider = provider_for(addr);

    let first = provider.refresh().await.unwrap();
    let token = first.change_token();
    assert!(!token.has_changed());

    let waiter = {
        let token = token.clone();
        tokio::spawn(async move { token.changed().await })
    };

    provider.refresh().await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter should observe supersession")
        .unwrap();
    assert!(token.has_changed());

    // The freshly published snapshot carries an unfired token of its own.
    assert!(!provider.current().change_token().has_changed());
}

#[tokio::test]
async fn concurrent_refreshes_are_rejected_while_one_is_in_flight() {
    let cluster = MockCluster::new(single_service_topology(
        "App1",
        "App1/Svc1",
        vec![("1331", r#"{"Endpoints":{"":"http://h1:10"}}"#)],
    ));
    cluster.set_replica_delay(Duration::from_millis(300));
    let addr = serve(cluster).await;
    let provider = provider_for(addr);

    let slow = {
        let provider = Arc::clone(&provider);
        tokio::spawn(async move { provider.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let overlapping = provider.refresh().await;
    assert!(matches!(overlapping, Err(RefreshError::Busy)));

    let published = slow.await.unwrap().unwrap();
    assert_eq!(published.version, 1);
    assert_eq!(provider.current().version, 1);
}
