//! Sync handlers: run, resolve, status, auto-sync toggle.

use chrono::{DateTime, Utc};
use quotesync_engine::{Conflict, Resolution};
use serde::{Deserialize, Serialize};

use crate::db::KeyValueStore;
use crate::error::Result;
use crate::remote::RemoteSource;
use crate::sync::{ResolveOutcome, SyncOrchestrator, SyncOutcome, SyncScheduler};

/// Response for a manual sync.
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    #[serde(flatten)]
    pub outcome: SyncOutcome,
    /// Banner text for the outcome
    pub message: String,
}

/// Request to override pending conflicts.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub resolutions: Vec<Resolution>,
}

/// Request to switch periodic sync on or off.
#[derive(Debug, Serialize, Deserialize)]
pub struct AutoSyncRequest {
    pub enabled: bool,
}

/// Response for a status query.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    pub auto_sync: bool,
    pub in_progress: bool,
    pub quote_count: usize,
    pub pending_conflicts: Vec<Conflict>,
}

pub async fn handle_sync<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
) -> SyncResponse {
    let outcome = orchestrator.run_sync().await;
    SyncResponse {
        message: outcome.summary(),
        outcome,
    }
}

pub async fn handle_resolve<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
    resolutions: &[Resolution],
) -> Result<ResolveOutcome> {
    Ok(orchestrator.resolve(resolutions).await?)
}

pub async fn handle_status<R: RemoteSource, K: KeyValueStore>(
    orchestrator: &SyncOrchestrator<R, K>,
    scheduler: &SyncScheduler,
) -> StatusResponse {
    let status = orchestrator.status().await;
    StatusResponse {
        last_sync_at: status.last_sync_at,
        auto_sync: scheduler.is_enabled(),
        in_progress: status.in_progress,
        quote_count: status.quote_count,
        pending_conflicts: status.pending_conflicts,
    }
}

pub fn handle_auto_sync(scheduler: &SyncScheduler, request: AutoSyncRequest) -> AutoSyncRequest {
    scheduler.set_enabled(request.enabled);
    AutoSyncRequest {
        enabled: scheduler.is_enabled(),
    }
}
