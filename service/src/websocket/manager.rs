//! WebSocket connection manager.
//!
//! Tracks connected UI clients and fans sync notifications out to them.

use std::sync::Arc;

use dashmap::DashMap;
use quotesync_engine::Conflict;
use tokio::sync::mpsc;

use super::ServerMessage;
use crate::sync::{SyncListener, SyncOutcome};

/// Sender for WebSocket messages.
pub type MessageSender = mpsc::UnboundedSender<ServerMessage>;

/// Manages active WebSocket connections.
///
/// Thread-safe and can be shared across handlers via `Arc`.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    /// All active connections, keyed by connection ID.
    connections: DashMap<String, MessageSender>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection and return its ID.
    pub fn register(&self, sender: MessageSender) -> String {
        let conn_id = uuid::Uuid::new_v4().to_string();
        self.connections.insert(conn_id.clone(), sender);

        tracing::info!(conn_id = %conn_id, "WebSocket connection registered");
        conn_id
    }

    pub fn unregister(&self, conn_id: &str) {
        if self.connections.remove(conn_id).is_some() {
            tracing::info!(conn_id = %conn_id, "WebSocket connection unregistered");
        }
    }

    /// Broadcast a message to all connections.
    ///
    /// Returns the number of connections that received the message.
    pub fn broadcast_all(&self, message: ServerMessage) -> usize {
        let mut sent_count = 0;

        for entry in self.connections.iter() {
            if entry.value().send(message.clone()).is_ok() {
                sent_count += 1;
            }
        }

        tracing::debug!(recipients = sent_count, "Broadcast message to connections");
        sent_count
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, conn_id: &str, message: ServerMessage) -> bool {
        self.connections
            .get(conn_id)
            .is_some_and(|sender| sender.send(message).is_ok())
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl SyncListener for ConnectionManager {
    fn on_sync_complete(&self, outcome: &SyncOutcome) {
        self.broadcast_all(ServerMessage::sync_complete(outcome.clone(), None));
    }

    fn on_conflicts(&self, conflicts: &[Conflict]) {
        self.broadcast_all(ServerMessage::Conflicts {
            conflicts: conflicts.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unregister() {
        let manager = ConnectionManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let conn_id = manager.register(tx);
        assert_eq!(manager.connection_count(), 1);

        manager.unregister(&conn_id);
        assert_eq!(manager.connection_count(), 0);
        assert!(!manager.send_to(&conn_id, ServerMessage::Pong));
    }

    #[test]
    fn test_broadcast_all() {
        let manager = ConnectionManager::new();

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();

        manager.register(tx1);
        manager.register(tx2);
        drop(rx2);

        // Closed receivers are not counted
        let sent = manager.broadcast_all(ServerMessage::Pong);
        assert_eq!(sent, 1);
        assert!(matches!(rx1.try_recv().unwrap(), ServerMessage::Pong));
    }

    #[test]
    fn test_listener_broadcasts_outcome() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register(tx);

        manager.on_sync_complete(&SyncOutcome::failed("offline"));

        match rx.try_recv().unwrap() {
            ServerMessage::SyncComplete { outcome, message, .. } => {
                assert!(outcome.failed);
                assert_eq!(message, "Failed to sync with server.");
            }
            other => panic!("Expected SyncComplete, got {:?}", other),
        }
    }
}
