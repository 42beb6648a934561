//! Notification hooks for the UI collaborator.

use quotesync_engine::Conflict;

use super::SyncOutcome;

/// Receives sync results as they happen.
///
/// Called on the sync task after the result is persisted; implementations
/// must not block.
pub trait SyncListener: Send + Sync {
    /// A sync run finished (successfully or not). Not called for skipped runs.
    fn on_sync_complete(&self, outcome: &SyncOutcome);

    /// A sync run found conflicts. They are already merged server-wins and
    /// can be overridden through `SyncOrchestrator::resolve`.
    fn on_conflicts(&self, conflicts: &[Conflict]);
}
