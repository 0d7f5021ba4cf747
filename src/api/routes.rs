//! Route configuration.

use crate::api::proxy;
use crate::state::AppState;
use axum::Router;
use axum::routing::any;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

/// Path prefix forwarded to the backend.
pub const API_PREFIX: &str = "/api";

/// Creates the front server router.
///
/// Requests under `/api` are proxied to the backend. Everything else is served
/// from the static asset directory, with unmatched paths falling back to the
/// single-page-app entry document.
pub fn create_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.server.static_dir)
        .fallback(ServeFile::new(state.config.server.index_path()));

    Router::new()
        .route(API_PREFIX, any(proxy::forward))
        .route("/api/", any(proxy::forward))
        .route("/api/{*path}", any(proxy::forward))
        .fallback_service(assets)
        .with_state(state)
}
