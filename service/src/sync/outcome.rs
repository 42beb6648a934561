//! Result types reported by the orchestrator.

use chrono::{DateTime, Utc};
use quotesync_engine::Conflict;
use serde::{Deserialize, Serialize};

/// Result of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// Size of the collection after the merge
    pub merged_count: usize,
    /// Number of conflicts detected (and resolved server-wins)
    pub conflict_count: usize,
    /// The conflicts themselves, for manual override
    pub conflicts: Vec<Conflict>,
    /// Whether the best-effort push was accepted
    pub pushed: bool,
    /// The run aborted; nothing was persisted
    pub failed: bool,
    /// Another run was already in flight; nothing was done
    pub skipped: bool,
    /// When the merged collection was committed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
    /// Diagnostic for a failed run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncOutcome {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            failed: true,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// One-line message for a notification banner.
    pub fn summary(&self) -> String {
        if self.skipped {
            "Sync already in progress.".to_string()
        } else if self.failed {
            "Failed to sync with server.".to_string()
        } else if self.conflict_count > 0 {
            format!(
                "Data synced with server. {} conflicts resolved.",
                self.conflict_count
            )
        } else {
            "Quotes successfully synced with server.".to_string()
        }
    }
}

/// Result of applying manual resolutions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    /// Resolutions that matched a pending conflict
    pub applied: usize,
    /// Resolutions for ids without a pending conflict
    pub ignored: usize,
    /// Conflicts still waiting for a decision
    pub remaining_conflicts: usize,
    /// Size of the collection after the re-merge
    pub merged_count: usize,
}

/// Snapshot of the orchestrator's state for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    pub in_progress: bool,
    pub quote_count: usize,
    pub pending_conflicts: Vec<Conflict>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries() {
        assert_eq!(
            SyncOutcome::default().summary(),
            "Quotes successfully synced with server."
        );
        assert_eq!(
            SyncOutcome {
                conflict_count: 2,
                ..Default::default()
            }
            .summary(),
            "Data synced with server. 2 conflicts resolved."
        );
        assert_eq!(
            SyncOutcome::failed("boom").summary(),
            "Failed to sync with server."
        );
    }

    #[test]
    fn outcome_serialization() {
        let json = serde_json::to_string(&SyncOutcome::skipped()).unwrap();
        assert!(json.contains("\"skipped\":true"));
        assert!(json.contains("\"mergedCount\":0"));
        assert!(!json.contains("syncedAt"));
        assert!(!json.contains("error"));
    }
}
