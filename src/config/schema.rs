//! Settings schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML settings
//! file; every field has a default so partial files stay valid.

use serde::{Deserialize, Serialize};

/// Root settings for the synchronizer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// How to reach the cluster's topology service.
    pub topology: TopologySettings,

    /// Admin surface (refresh trigger, snapshot dump).
    pub admin: AdminSettings,

    /// Logging and metrics.
    pub observability: ObservabilitySettings,
}

/// Which topology transport binding to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyMode {
    /// HTTP/JSON queries against the cluster's REST endpoint.
    Rest,
    /// A native cluster-management driver supplied by the embedding host.
    Native,
}

/// Topology service connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TopologySettings {
    pub mode: TopologyMode,

    /// Base URI of the cluster management endpoint.
    pub base_uri: String,

    /// `api-version` query parameter sent with every REST query.
    pub api_version: String,

    /// Per-request timeout for topology queries, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum concurrent traversal branches; 0 means unbounded.
    pub fanout: usize,
}

impl TopologySettings {
    /// Fan-out limit in the form the synchronizer consumes.
    pub fn fanout_limit(&self) -> Option<usize> {
        if self.fanout == 0 {
            None
        } else {
            Some(self.fanout)
        }
    }
}

impl Default for TopologySettings {
    fn default() -> Self {
        Self {
            mode: TopologyMode::Rest,
            base_uri: "http://localhost:19080".to_string(),
            api_version: "3.0".to_string(),
            request_timeout_secs: 10,
            fanout: 0,
        }
    }
}

/// Admin surface settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Bind address for the admin endpoints.
    pub bind_address: String,

    /// Bearer token required on admin requests; empty disables auth.
    pub api_key: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            api_key: String::new(),
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
