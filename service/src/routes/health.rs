//! Health check endpoint.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::db::KeyValueStore;
use crate::remote::RemoteSource;
use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create health routes.
pub fn routes<R: RemoteSource, K: KeyValueStore>() -> Router<AppState<R, K>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn root() -> &'static str {
    "Quote Sync"
}
