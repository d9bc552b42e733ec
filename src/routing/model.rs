//! Routing data model.
//!
//! Shapes mirror what a proxy dispatch engine consumes: named clusters of
//! backend destinations, and path-matching routes bound to one cluster with
//! an ordered list of request transforms.

use std::collections::BTreeMap;

use serde::Serialize;

/// One backend endpoint a route can forward to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    /// Absolute URL of the endpoint, e.g. `http://host:30005`.
    pub address: String,
}

/// A named group of backend destinations.
///
/// Destination keys are `partitionId:replicaId`, which keeps replicas of
/// different partitions distinguishable even when their URLs collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub id: String,
    pub destinations: BTreeMap<String, Destination>,
}

/// An ordered request rewrite applied before forwarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "PascalCase")]
pub enum RouteTransform {
    /// Remove a leading path segment, e.g. `/Svc1/a/b` → `/a/b`.
    PathRemovePrefix { prefix: String },
    /// Set (or replace) a request header.
    RequestHeader { name: String, value: String },
}

/// Minimal view of a request being rewritten for forwarding.
///
/// The dispatch engine owns the real request; this exists so transform
/// semantics are specified and testable inside this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedCall {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl ForwardedCall {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl RouteTransform {
    pub fn apply(&self, call: &mut ForwardedCall) {
        match self {
            RouteTransform::PathRemovePrefix { prefix } => {
                if let Some(rest) = call.path.strip_prefix(prefix.as_str()) {
                    // Stripping the whole path leaves the root.
                    call.path = if rest.is_empty() {
                        "/".to_string()
                    } else {
                        rest.to_string()
                    };
                }
            }
            RouteTransform::RequestHeader { name, value } => {
                if let Some(existing) = call
                    .headers
                    .iter_mut()
                    .find(|(n, _)| n.eq_ignore_ascii_case(name))
                {
                    existing.1 = value.clone();
                } else {
                    call.headers.push((name.clone(), value.clone()));
                }
            }
        }
    }
}

/// A path-matching rule bound to one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub route_id: String,
    pub cluster_id: String,
    /// Path pattern the dispatch engine matches against, e.g.
    /// `Svc1/{**rest}` or the bare service name for a root match.
    pub path_match: String,
    pub transforms: Vec<RouteTransform>,
}

impl Route {
    /// Apply every transform in order.
    pub fn apply_transforms(&self, call: &mut ForwardedCall) {
        for transform in &self.transforms {
            transform.apply(call);
        }
    }
}
