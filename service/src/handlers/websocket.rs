//! WebSocket handler for the UI channel.
//!
//! A client gets every sync result broadcast to it. Requests it sends are
//! answered on the same socket, tagged with the client's `request_id`; a
//! requested sync is therefore seen twice, once as the broadcast and once
//! as the tagged reply.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::{handle_resolve, handle_sync};
use crate::db::KeyValueStore;
use crate::remote::RemoteSource;
use crate::sync::SyncOrchestrator;
use crate::websocket::{ClientMessage, ConnectionManager, ServerMessage};

/// Handle an established WebSocket connection.
///
/// This function:
/// 1. Registers the connection with the manager
/// 2. Spawns a task to forward outgoing messages
/// 3. Processes incoming messages in a loop
/// 4. Cleans up on disconnect
pub async fn handle_websocket_connection<R: RemoteSource, K: KeyValueStore>(
    socket: WebSocket,
    orchestrator: Arc<SyncOrchestrator<R, K>>,
    conn_manager: Arc<ConnectionManager>,
) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let conn_id = conn_manager.register(tx);

    tracing::info!(conn_id = %conn_id, "WebSocket client connected");

    // Forward messages from the channel to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                        tracing::warn!("Failed to send WebSocket message: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize WebSocket message: {}", e);
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = process_message(&text, &orchestrator).await;
                conn_manager.send_to(&conn_id, response);
            }
            Ok(Message::Binary(_)) => {
                tracing::warn!("Binary messages not supported");
            }
            Ok(Message::Ping(data)) => {
                tracing::trace!("Received ping: {} bytes", data.len());
            }
            Ok(Message::Pong(_)) => {
                tracing::trace!("Received pong");
            }
            Ok(Message::Close(_)) => {
                tracing::info!(conn_id = %conn_id, "WebSocket close frame received");
                break;
            }
            Err(e) => {
                tracing::warn!(conn_id = %conn_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    conn_manager.unregister(&conn_id);
    send_task.abort();

    tracing::info!(
        conn_id = %conn_id,
        active_connections = conn_manager.connection_count(),
        "WebSocket client disconnected"
    );
}

/// Process a client message and return the reply.
async fn process_message<R: RemoteSource, K: KeyValueStore>(
    text: &str,
    orchestrator: &SyncOrchestrator<R, K>,
) -> ServerMessage {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            return ServerMessage::error(format!("Invalid message format: {}", e), None);
        }
    };

    match client_msg {
        ClientMessage::Sync { request_id } => {
            let response = handle_sync(orchestrator).await;
            ServerMessage::sync_complete(response.outcome, request_id)
        }

        ClientMessage::Resolve {
            resolutions,
            request_id,
        } => match handle_resolve(orchestrator, &resolutions).await {
            Ok(outcome) => ServerMessage::Resolved {
                outcome,
                request_id,
            },
            Err(e) => ServerMessage::error(e.to_string(), request_id),
        },

        ClientMessage::Ping => ServerMessage::Pong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryKv;
    use crate::store::LocalStore;
    use quotesync_engine::Collection;

    struct EmptyRemote;

    impl RemoteSource for EmptyRemote {
        async fn fetch_remote(&self) -> Collection {
            Collection::new()
        }

        async fn push_local(&self, _collection: &Collection) -> bool {
            true
        }
    }

    async fn orchestrator() -> SyncOrchestrator<EmptyRemote, MemoryKv> {
        SyncOrchestrator::open(LocalStore::new(MemoryKv::new()), EmptyRemote).await
    }

    #[tokio::test]
    async fn ping_gets_pong() {
        let orchestrator = orchestrator().await;
        let reply = process_message(r#"{"type": "ping"}"#, &orchestrator).await;
        assert!(matches!(reply, ServerMessage::Pong));
    }

    #[tokio::test]
    async fn garbage_gets_error() {
        let orchestrator = orchestrator().await;
        let reply = process_message("not json", &orchestrator).await;
        assert!(matches!(reply, ServerMessage::Error { request_id: None, .. }));
    }

    #[tokio::test]
    async fn sync_reply_carries_request_id() {
        let orchestrator = orchestrator().await;
        let reply =
            process_message(r#"{"type": "sync", "request_id": "abc"}"#, &orchestrator).await;

        match reply {
            ServerMessage::SyncComplete {
                outcome,
                request_id,
                ..
            } => {
                assert!(!outcome.failed);
                assert!(outcome.pushed);
                assert_eq!(request_id.as_deref(), Some("abc"));
            }
            other => panic!("Expected SyncComplete, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn resolve_without_conflicts_is_an_error() {
        let orchestrator = orchestrator().await;
        let reply = process_message(
            r#"{"type": "resolve", "resolutions": [{"id": 1, "choice": "server"}], "request_id": "r"}"#,
            &orchestrator,
        )
        .await;

        match reply {
            ServerMessage::Error {
                message,
                request_id,
            } => {
                assert!(message.contains("No pending conflicts"));
                assert_eq!(request_id.as_deref(), Some("r"));
            }
            other => panic!("Expected Error, got {:?}", other),
        }
    }
}
