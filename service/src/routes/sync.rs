//! Sync endpoint routes.

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};

use crate::db::KeyValueStore;
use crate::error::Result;
use crate::handlers::{
    handle_auto_sync, handle_resolve, handle_status, handle_sync, AutoSyncRequest,
    ResolveRequest, StatusResponse, SyncResponse,
};
use crate::remote::RemoteSource;
use crate::sync::ResolveOutcome;
use crate::AppState;

/// Create sync routes.
pub fn routes<R: RemoteSource, K: KeyValueStore>() -> Router<AppState<R, K>> {
    Router::new()
        .route("/sync", post(sync_handler::<R, K>))
        .route("/sync/resolve", post(resolve_handler::<R, K>))
        .route("/sync/status", get(status_handler::<R, K>))
        .route("/sync/auto", put(auto_handler::<R, K>))
}

/// POST /sync - Run a sync now.
async fn sync_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
) -> Json<SyncResponse> {
    Json(handle_sync(&state.orchestrator).await)
}

/// POST /sync/resolve - Override pending conflicts.
async fn resolve_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveOutcome>> {
    let outcome = handle_resolve(&state.orchestrator, &request.resolutions).await?;
    Ok(Json(outcome))
}

/// GET /sync/status - Last sync, auto-sync flag and pending conflicts.
async fn status_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
) -> Json<StatusResponse> {
    Json(handle_status(&state.orchestrator, &state.scheduler).await)
}

/// PUT /sync/auto - Enable or disable periodic sync.
async fn auto_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
    Json(request): Json<AutoSyncRequest>,
) -> Json<AutoSyncRequest> {
    Json(handle_auto_sync(&state.scheduler, request))
}
