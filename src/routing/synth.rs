//! Route and cluster synthesis.
//!
//! # Responsibilities
//! - Derive one cluster per discovered service
//! - Derive two routes per service: a catch-all path match and a root match
//! - Attach the prefix-strip and forwarded-path-base transforms to both
//!
//! A service with no reachable replicas still yields its cluster and routes
//! with an empty destination set: it stays addressable and the next cycle
//! repopulates it.

use std::collections::BTreeMap;

use crate::topology::ServiceName;

use super::model::{Cluster, Destination, Route, RouteTransform};

/// Header that tells the backend which path base was stripped off.
pub const FORWARDED_PATH_BASE_HEADER: &str = "X-Forwarded-PathBase";

/// Build the cluster and both routes for one service.
pub fn synthesize(
    service: &ServiceName,
    destinations: BTreeMap<String, Destination>,
) -> (Cluster, [Route; 2]) {
    let name = service.as_str();
    let prefix = format!("/{name}");
    let transforms = vec![
        RouteTransform::PathRemovePrefix {
            prefix: prefix.clone(),
        },
        RouteTransform::RequestHeader {
            name: FORWARDED_PATH_BASE_HEADER.to_string(),
            value: prefix,
        },
    ];

    let cluster = Cluster {
        id: name.to_string(),
        destinations,
    };
    let catch_all = Route {
        route_id: format!("{name}:catch-all"),
        cluster_id: name.to_string(),
        path_match: format!("{name}/{{**rest}}"),
        transforms: transforms.clone(),
    };
    let root_match = Route {
        route_id: format!("{name}:root-match"),
        cluster_id: name.to_string(),
        path_match: name.to_string(),
        transforms,
    };

    (cluster, [catch_all, root_match])
}
