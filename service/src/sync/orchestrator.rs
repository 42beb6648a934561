//! Sync orchestrator - owner of the local collection.
//!
//! All mutations of the collection go through here and are serialized by one
//! async mutex. The mutex is never held across remote I/O; a separate
//! in-progress flag keeps two sync runs from overlapping.
//!
//! # Algorithm
//!
//! 1. Push the current collection (best-effort, result only reported)
//! 2. Pull the remote collection (never fails, see [`RemoteSource`])
//! 3. Detect conflicts against the collection as it is *now*
//! 4. Merge server-wins, unconditionally
//! 5. Commit the merged collection and sync time in one batch, then swap it in
//! 6. Keep the conflicts so the UI can override them with [`SyncOrchestrator::resolve`]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use quotesync_engine::{
    codec, detect_conflicts, merge_server_wins, merge_with_resolutions, Collection, Conflict,
    IdSequence, ImportReport, Quote, Resolution,
};
use tokio::sync::Mutex;

use super::{ResolveOutcome, SyncListener, SyncOutcome, SyncStatus};
use crate::db::KeyValueStore;
use crate::error::SyncError;
use crate::remote::RemoteSource;
use crate::store::{default_collection, LocalStore};

/// Conflicts from earlier pulls that still wait for a user decision.
#[derive(Debug, Clone)]
struct PendingConflicts {
    /// Conflicts with the pre-merge local versions
    conflicts: Vec<Conflict>,
    /// The remote snapshot the conflicts were merged against
    remote: Collection,
}

impl PendingConflicts {
    /// Combine fresh conflicts with older ones the new pull did not supersede.
    ///
    /// An older conflict survives while the remote still holds the same
    /// version it lost to.
    fn carry_over(previous: Option<Self>, fresh: Vec<Conflict>, remote: Collection) -> Option<Self> {
        let mut conflicts = fresh;

        if let Some(previous) = previous {
            for old in previous.conflicts {
                let superseded = conflicts.iter().any(|c| c.id == old.id);
                let still_current = remote.get(old.id) == Some(&old.server);
                if !superseded && still_current {
                    conflicts.push(old);
                }
            }
        }

        if conflicts.is_empty() {
            return None;
        }
        conflicts.sort_by_key(|c| c.id);
        Some(Self { conflicts, remote })
    }
}

/// Mutable state guarded by the orchestrator's mutex.
#[derive(Debug)]
struct SyncState {
    quotes: Collection,
    ids: IdSequence,
    pending: Option<PendingConflicts>,
}

/// Resets the in-progress flag when a sync run ends, however it ends.
struct InProgressGuard<'a>(&'a AtomicBool);

impl<'a> InProgressGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sequences sync runs and owns the collection between them.
pub struct SyncOrchestrator<R, K> {
    store: LocalStore<K>,
    remote: R,
    state: Mutex<SyncState>,
    in_progress: AtomicBool,
    listeners: Vec<Arc<dyn SyncListener>>,
}

impl<R: RemoteSource, K: KeyValueStore> SyncOrchestrator<R, K> {
    /// Load the persisted collection (or the defaults) and get ready to sync.
    pub async fn open(store: LocalStore<K>, remote: R) -> Self {
        let quotes = store.load().await;
        let ids = store.id_sequence(&quotes).await;

        tracing::info!(quotes = quotes.len(), "Local collection loaded");

        Self {
            store,
            remote,
            state: Mutex::new(SyncState {
                quotes,
                ids,
                pending: None,
            }),
            in_progress: AtomicBool::new(false),
            listeners: Vec::new(),
        }
    }

    /// Register a listener for sync results.
    pub fn with_listener(mut self, listener: Arc<dyn SyncListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn store(&self) -> &LocalStore<K> {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Whether a sync run is currently in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run one push-pull-merge cycle.
    ///
    /// Returns immediately with `skipped` when another run is in flight.
    /// Failures are reported in the outcome, never raised; a failed run
    /// leaves both the stored and the in-memory collection untouched.
    pub async fn run_sync(&self) -> SyncOutcome {
        let Some(_guard) = InProgressGuard::acquire(&self.in_progress) else {
            tracing::debug!("Sync already in progress, skipping");
            return SyncOutcome::skipped();
        };

        let snapshot = self.state.lock().await.quotes.clone();

        let pushed = self.remote.push_local(&snapshot).await;
        let remote = self.remote.fetch_remote().await;

        let mut outcome = match self.apply_pull(remote).await {
            Ok(outcome) => {
                tracing::info!(
                    merged = outcome.merged_count,
                    conflicts = outcome.conflict_count,
                    "Sync completed"
                );
                outcome
            }
            Err(e) => {
                tracing::error!(error = %e, "Sync failed, keeping previous collection");
                SyncOutcome::failed(e.to_string())
            }
        };
        outcome.pushed = pushed;

        for listener in &self.listeners {
            listener.on_sync_complete(&outcome);
            if !outcome.conflicts.is_empty() {
                listener.on_conflicts(&outcome.conflicts);
            }
        }

        outcome
    }

    /// Steps 3-6: everything after the pull, under the state lock.
    async fn apply_pull(&self, remote: Collection) -> Result<SyncOutcome, SyncError> {
        let mut state = self.state.lock().await;

        let conflicts = detect_conflicts(&state.quotes, &remote);
        let merged = merge_server_wins(&state.quotes, &remote)?;

        let synced_at = Utc::now();
        self.store.commit_sync(&merged, &state.ids, synced_at).await?;

        for conflict in &conflicts {
            tracing::debug!(id = conflict.id, "Conflict resolved server-wins");
        }

        state.quotes = merged;
        state.pending = PendingConflicts::carry_over(state.pending.take(), conflicts.clone(), remote);

        Ok(SyncOutcome {
            merged_count: state.quotes.len(),
            conflict_count: conflicts.len(),
            conflicts,
            synced_at: Some(synced_at),
            ..Default::default()
        })
    }

    /// Override pending conflicts with the user's choices.
    ///
    /// A `local` choice restores the version this client held before the
    /// server-wins merge overwrote it; a `server` choice (or no choice) keeps
    /// the remote version. Resolved conflicts leave the pending list, and
    /// their ids leave the remote snapshot so that later calls never
    /// re-merge a decision already taken.
    pub async fn resolve(&self, resolutions: &[Resolution]) -> Result<ResolveOutcome, SyncError> {
        let mut state = self.state.lock().await;
        let Some(pending) = state.pending.clone() else {
            return Err(SyncError::NoPendingConflicts);
        };

        let (applicable, ignored): (Vec<Resolution>, Vec<Resolution>) = resolutions
            .iter()
            .copied()
            .partition(|r| pending.conflicts.iter().any(|c| c.id == r.id));

        let mut local_view = state.quotes.clone();
        for conflict in &pending.conflicts {
            local_view.insert(conflict.local.clone());
        }

        let merged = merge_with_resolutions(&local_view, &pending.remote, &applicable)?;
        self.store.save(&merged, &state.ids).await?;

        let remaining: Vec<Conflict> = pending
            .conflicts
            .into_iter()
            .filter(|c| !applicable.iter().any(|r| r.id == c.id))
            .collect();
        let remaining_conflicts = remaining.len();

        let mut remote = pending.remote;
        for resolution in &applicable {
            remote.remove(resolution.id);
        }

        state.quotes = merged;
        state.pending = (!remaining.is_empty()).then(|| PendingConflicts {
            conflicts: remaining,
            remote,
        });

        tracing::info!(
            applied = applicable.len(),
            ignored = ignored.len(),
            remaining = remaining_conflicts,
            "Conflict resolutions applied"
        );

        Ok(ResolveOutcome {
            applied: applicable.len(),
            ignored: ignored.len(),
            remaining_conflicts,
            merged_count: state.quotes.len(),
        })
    }

    /// Add a quote typed by the user, persist it and push it best-effort.
    pub async fn add_local_quote(
        &self,
        text: &str,
        category: &str,
    ) -> Result<Quote, quotesync_engine::Error> {
        let quote = {
            let mut state = self.state.lock().await;
            let SyncState { quotes, ids, .. } = &mut *state;
            let quote = quotes.add_quote(ids, text, category, now_millis())?;
            self.persist(quotes, ids).await;
            quote
        };

        tracing::info!(id = quote.id, category = %quote.category, "Quote added");

        let single = Collection::from_unique([quote.clone()])?;
        if !self.remote.push_local(&single).await {
            tracing::debug!(id = quote.id, "New quote not pushed, next sync will carry it");
        }

        Ok(quote)
    }

    /// Import quotes from an exported JSON array.
    pub async fn import_collection(&self, text: &str) -> Result<ImportReport, quotesync_engine::Error> {
        let mut state = self.state.lock().await;
        let SyncState { quotes, ids, .. } = &mut *state;

        let report = codec::import_json(quotes, ids, text)?;
        if report.added > 0 {
            self.persist(quotes, ids).await;
        }

        tracing::info!(added = report.added, skipped = report.skipped, "Quotes imported");
        Ok(report)
    }

    /// Serialize the collection in the export format.
    pub async fn export_collection(&self) -> Result<String, quotesync_engine::Error> {
        let state = self.state.lock().await;
        codec::export_json(&state.quotes)
    }

    /// Reset the collection to the built-in defaults.
    ///
    /// The id sequence is not rewound, so ids handed out before the reset
    /// are never reused. Pending conflicts are dropped.
    pub async fn clear(&self) -> Collection {
        let mut state = self.state.lock().await;
        let SyncState {
            quotes,
            ids,
            pending,
        } = &mut *state;

        *quotes = match self.store.clear(ids).await {
            Ok(defaults) => defaults,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist reset, keeping it in memory");
                default_collection()
            }
        };
        *pending = None;

        tracing::info!("Collection reset to defaults");
        quotes.clone()
    }

    /// Quotes in id order, optionally restricted to one category.
    pub async fn quotes(&self, category: Option<&str>) -> Vec<Quote> {
        let state = self.state.lock().await;
        state.quotes.filtered(category).into_iter().cloned().collect()
    }

    /// `"all"` followed by every category in use.
    pub async fn categories(&self) -> Vec<String> {
        self.state.lock().await.quotes.categories()
    }

    /// Remember the category the user picked.
    pub async fn set_filter(&self, category: &str) {
        let _state = self.state.lock().await;
        if let Err(e) = self.store.set_last_filter(category).await {
            tracing::warn!(error = %e, "Failed to persist category filter");
        }
    }

    pub async fn last_filter(&self) -> Option<String> {
        self.store.last_filter().await
    }

    pub async fn pending_conflicts(&self) -> Vec<Conflict> {
        let state = self.state.lock().await;
        state
            .pending
            .as_ref()
            .map(|p| p.conflicts.clone())
            .unwrap_or_default()
    }

    pub async fn status(&self) -> SyncStatus {
        let (quote_count, pending_conflicts) = {
            let state = self.state.lock().await;
            let pending = state.pending.as_ref().map(|p| p.conflicts.clone());
            (state.quotes.len(), pending.unwrap_or_default())
        };

        SyncStatus {
            last_sync_at: self.store.last_sync().await,
            in_progress: self.is_syncing(),
            quote_count,
            pending_conflicts,
        }
    }

    /// Write the collection, keeping the in-memory change if the write fails.
    /// The next successful whole-collection write catches up.
    async fn persist(&self, quotes: &Collection, ids: &IdSequence) {
        if let Err(e) = self.store.save(quotes, ids).await {
            tracing::error!(error = %e, "Failed to persist quotes, keeping them in memory");
        }
    }
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}
