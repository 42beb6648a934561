//! WebSocket upgrade endpoint.

use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};

use crate::db::KeyValueStore;
use crate::handlers::handle_websocket_connection;
use crate::remote::RemoteSource;
use crate::AppState;

pub fn routes<R: RemoteSource, K: KeyValueStore>() -> Router<AppState<R, K>> {
    Router::new().route("/ws", get(ws_handler::<R, K>))
}

/// GET /ws - Upgrade to the UI notification channel.
async fn ws_handler<R: RemoteSource, K: KeyValueStore>(
    State(state): State<AppState<R, K>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| {
        handle_websocket_connection(socket, state.orchestrator, state.conn_manager)
    })
}
