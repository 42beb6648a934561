//! WebSocket message protocol definitions.
//!
//! All messages are JSON-encoded, tagged by `type`, and use snake_case for
//! tags and envelope fields. Payload structs keep their own camelCase.

use quotesync_engine::{Conflict, Resolution};
use serde::{Deserialize, Serialize};

use crate::sync::{ResolveOutcome, SyncOutcome};

/// Messages sent from the UI client to the service.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Run a sync now.
    Sync {
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Override pending conflicts.
    Resolve {
        resolutions: Vec<Resolution>,
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Keep-alive ping.
    Ping,
}

/// Messages sent from the service to UI clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A sync run finished. Broadcast to every client.
    SyncComplete {
        outcome: SyncOutcome,
        /// Banner text for the outcome
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// A sync run found conflicts, already merged server-wins.
    Conflicts { conflicts: Vec<Conflict> },

    /// Response to a resolve request.
    Resolved {
        outcome: ResolveOutcome,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Response to ping.
    Pong,

    /// Error message.
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>, request_id: Option<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
            request_id,
        }
    }

    pub fn sync_complete(outcome: SyncOutcome, request_id: Option<String>) -> Self {
        ServerMessage::SyncComplete {
            message: outcome.summary(),
            outcome,
            request_id,
        }
    }
}
