//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URIs before any socket or client is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: Settings → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use super::schema::Settings;

/// One semantic problem found in the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check everything serde cannot.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut push = |field: &'static str, message: String| {
        errors.push(ValidationError { field, message });
    };

    match Url::parse(&settings.topology.base_uri) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => push(
            "topology.base_uri",
            format!("unsupported scheme {:?}", url.scheme()),
        ),
        Err(error) => push("topology.base_uri", error.to_string()),
    }

    if settings.topology.api_version.trim().is_empty() {
        push("topology.api_version", "must not be empty".to_string());
    }

    if settings.topology.request_timeout_secs == 0 {
        push("topology.request_timeout_secs", "must be at least 1".to_string());
    }

    if let Err(error) = settings.admin.bind_address.parse::<SocketAddr>() {
        push("admin.bind_address", error.to_string());
    }

    if settings.observability.metrics_enabled {
        if let Err(error) = settings.observability.metrics_address.parse::<SocketAddr>() {
            push("observability.metrics_address", error.to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
