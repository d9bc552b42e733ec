use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::provider::RefreshError;

use super::AdminState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub snapshot_version: u64,
    pub routes: usize,
    pub clusters: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let snapshot = state.provider.current();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        snapshot_version: snapshot.version,
        routes: snapshot.routes.len(),
        clusters: snapshot.clusters.len(),
    })
}

/// Dump the current snapshot, pretty-printed for operator inspection.
pub async fn get_config(State(state): State<AdminState>) -> Response {
    let snapshot = state.provider.current();
    match serde_json::to_string_pretty(&*snapshot) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "failed to serialize snapshot");
            (StatusCode::INTERNAL_SERVER_ERROR, "serialization failed").into_response()
        }
    }
}

/// Run a synchronization cycle and report its outcome.
pub async fn post_update(State(state): State<AdminState>) -> Response {
    match state.provider.refresh().await {
        Ok(snapshot) => {
            tracing::info!(version = snapshot.version, "refresh triggered via admin");
            (StatusCode::OK, "Updated.").into_response()
        }
        Err(RefreshError::Busy) => {
            (StatusCode::CONFLICT, "Refresh already in progress.").into_response()
        }
        Err(error) => (StatusCode::BAD_GATEWAY, error.to_string()).into_response(),
    }
}
