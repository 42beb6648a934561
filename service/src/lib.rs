//! Quote Sync Service - local-first quote collection with periodic remote sync.
//!
//! The service owns the quote collection on behalf of a UI. It persists the
//! collection in SQLite, merges a remote collection into it on a timer or on
//! demand, and exposes everything through a local HTTP + WebSocket API.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod remote;
pub mod routes;
pub mod store;
pub mod sync;
pub mod websocket;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::KeyValueStore;
use crate::remote::RemoteSource;
use crate::sync::{SyncOrchestrator, SyncScheduler};
use crate::websocket::ConnectionManager;

/// Application state shared across handlers.
pub struct AppState<R, K> {
    pub orchestrator: Arc<SyncOrchestrator<R, K>>,
    pub scheduler: Arc<SyncScheduler>,
    pub config: Arc<Config>,
    pub conn_manager: Arc<ConnectionManager>,
}

impl<R, K> Clone for AppState<R, K> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            scheduler: Arc::clone(&self.scheduler),
            config: Arc::clone(&self.config),
            conn_manager: Arc::clone(&self.conn_manager),
        }
    }
}

/// Build the full application router with tracing and CORS layers.
pub fn build_router<R, K>(state: AppState<R, K>) -> Router
where
    R: RemoteSource,
    K: KeyValueStore,
{
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
