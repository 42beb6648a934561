//! HTTP route definitions.

mod health;
mod quotes;
mod sync;
mod ws;

use axum::Router;

use crate::db::KeyValueStore;
use crate::remote::RemoteSource;
use crate::AppState;

/// Create all application routes.
pub fn create_routes<R: RemoteSource, K: KeyValueStore>() -> Router<AppState<R, K>> {
    Router::new()
        .merge(health::routes())
        .merge(quotes::routes())
        .merge(sync::routes())
        .merge(ws::routes())
}
