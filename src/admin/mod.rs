//! Admin surface for the hosting layer.
//!
//! # Responsibilities
//! - `POST /proxy/update`: trigger a full synchronization cycle
//! - `GET /proxy/config`: dump the current snapshot as JSON
//! - `GET /proxy/status`: version and size of the current snapshot
//!
//! # Design Decisions
//! - Refresh reports its outcome explicitly: "Updated.", 409 when a cycle
//!   is already in flight, 502 when the traversal aborted
//! - Bearer-token auth only when an api_key is configured

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::provider::ConfigProvider;

use self::auth::admin_auth_middleware;
use self::handlers::{get_config, get_status, post_update};

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub provider: Arc<ConfigProvider>,
    pub api_key: String,
}

/// Build the admin router.
pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/proxy/status", get(get_status))
        .route("/proxy/config", get(get_config))
        .route("/proxy/update", post(post_update))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
