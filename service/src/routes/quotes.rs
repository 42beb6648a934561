//! Quote collection routes.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use quotesync_engine::{ImportReport, Quote};

use crate::db::KeyValueStore;
use crate::error::{AppError, Result};
use crate::handlers::{
    handle_add, handle_categories, handle_clear, handle_export, handle_import, handle_list,
    AddQuoteRequest, CategoriesResponse, ListQuery, ListResponse,
};
use crate::remote::RemoteSource;
use crate::AppState;

/// Create quote routes.
pub fn routes<R: RemoteSource, K: KeyValueStore>() -> Router<AppState<R, K>> {
    Router::new()
        .route(
            "/quotes",
            get(list_handler::<R, K>)
                .post(add_handler::<R, K>)
                .delete(clear_handler::<R, K>),
        )
        .route("/quotes/categories", get(categories_handler::<R, K>))
        .route("/quotes/export", get(export_handler::<R, K>))
        .route("/quotes/import", post(import_handler::<R, K>))
}

/// GET /quotes - List quotes, optionally by category.
async fn list_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse> {
    Json(handle_list(&state.orchestrator, query).await)
}

/// POST /quotes - Add a quote.
async fn add_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
    Json(request): Json<AddQuoteRequest>,
) -> Result<(StatusCode, Json<Quote>)> {
    let quote = handle_add(&state.orchestrator, request).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

/// DELETE /quotes - Reset to the default collection.
async fn clear_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
) -> Json<Vec<Quote>> {
    Json(handle_clear(&state.orchestrator).await)
}

/// GET /quotes/categories - Category choices for the filter.
async fn categories_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
) -> Json<CategoriesResponse> {
    Json(handle_categories(&state.orchestrator).await)
}

/// GET /quotes/export - Download the collection as `quotes.json`.
async fn export_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
) -> Result<impl IntoResponse> {
    let body = handle_export(&state.orchestrator).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"quotes.json\""),
        ],
        body,
    ))
}

/// POST /quotes/import - Import a JSON array of quotes.
async fn import_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
    body: String,
) -> Result<Json<ImportReport>> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("Empty import payload".to_string()));
    }
    let report = handle_import(&state.orchestrator, &body).await?;
    Ok(Json(report))
}
