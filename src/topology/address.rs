//! Replica address decoding.
//!
//! # Responsibilities
//! - Parse a replica's raw address payload into listener → URL pairs
//! - Turn empty or malformed payloads into a typed error, never a panic
//!
//! The payload format is a JSON object such as
//! `{"Endpoints":{"":"http://host:30005"}}`; the empty listener name is the
//! service's default endpoint. The synchronizer treats a decode failure as
//! skip-this-replica, so a partially addressed cluster still publishes.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct ReplicaAddress {
    #[serde(rename = "Endpoints")]
    endpoints: BTreeMap<String, String>,
}

/// The replica's address payload could not be turned into endpoints.
#[derive(Debug, Error)]
pub enum AddressDecodeError {
    #[error("replica address payload is empty")]
    Empty,

    #[error("replica address payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("replica address payload lists no endpoints")]
    NoEndpoints,
}

/// Decode a raw address payload into `(listener, url)` pairs.
pub fn decode_replica_address(
    raw: &str,
) -> Result<Vec<(String, String)>, AddressDecodeError> {
    if raw.trim().is_empty() {
        return Err(AddressDecodeError::Empty);
    }
    let address: ReplicaAddress = serde_json::from_str(raw)?;
    if address.endpoints.is_empty() {
        return Err(AddressDecodeError::NoEndpoints);
    }
    Ok(address.endpoints.into_iter().collect())
}
