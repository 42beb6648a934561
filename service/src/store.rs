//! Local store - persistence of the quote collection and sync metadata.
//!
//! Two logical keys are used, each holding one JSON document that is
//! overwritten as a whole:
//!
//! - `quotes`: the collection as an array of `{id, text, category, updatedAt?}`
//! - `sync_meta`: `{lastSyncAt?, lastFilter?, lastLocalId?}`
//!
//! Reads never fail: unreadable or unusable data degrades to the built-in
//! defaults. Writes report their errors so the caller can decide.

use chrono::{DateTime, Utc};
use quotesync_engine::{codec, Collection, IdSequence, Quote, QuoteId};
use serde::{Deserialize, Serialize};

use crate::db::KeyValueStore;
use crate::error::StoreError;

/// Key holding the serialized collection.
pub const QUOTES_KEY: &str = "quotes";

/// Key holding the serialized [`SyncMetadata`].
pub const META_KEY: &str = "sync_meta";

/// Metadata persisted next to the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    /// Completion time of the last successful sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Category filter the user selected last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_filter: Option<String>,
    /// Highest local id ever handed out, so ids survive a clear and a restart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_local_id: Option<QuoteId>,
}

/// The collection a fresh client starts with.
pub fn default_collection() -> Collection {
    let quotes = [
        (1, "The best way to get started is to quit talking and begin doing.", "Motivation"),
        (2, "Life is what happens when you're busy making other plans.", "Life"),
        (3, "Simplicity is the soul of efficiency.", "Productivity"),
    ];

    let mut collection = Collection::new();
    for (id, text, category) in quotes {
        collection.insert(Quote::new(id, text, category));
    }
    collection
}

/// Persistence front-end over a [`KeyValueStore`].
#[derive(Debug)]
pub struct LocalStore<K> {
    kv: K,
}

impl<K: KeyValueStore> LocalStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Access the underlying key-value store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Load the persisted collection, or the defaults when there is nothing usable.
    pub async fn load(&self) -> Collection {
        let raw = match self.kv.get(QUOTES_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored quotes, using defaults");
                None
            }
        };

        let Some(raw) = raw else {
            tracing::debug!("No stored quotes, using defaults");
            return default_collection();
        };

        match codec::decode_stored(&raw) {
            Some(collection) => {
                tracing::debug!(quotes = collection.len(), "Loaded stored quotes");
                collection
            }
            None => {
                tracing::warn!("Stored quotes unusable, using defaults");
                default_collection()
            }
        }
    }

    /// Persist the full collection and the id sequence in one batch,
    /// replacing what was stored.
    pub async fn save(&self, collection: &Collection, ids: &IdSequence) -> Result<(), StoreError> {
        let mut meta = self.metadata().await;
        meta.last_local_id = Some(ids.last);
        self.write(collection, &meta).await
    }

    /// Id sequence for `collection`, continuing after every id handed out
    /// before, including ids of quotes that no longer exist.
    pub async fn id_sequence(&self, collection: &Collection) -> IdSequence {
        let mut ids = collection.id_sequence();
        if let Some(last) = self.metadata().await.last_local_id {
            ids.observe(last);
        }
        ids
    }

    /// Read the metadata document, degrading to empty metadata.
    pub async fn metadata(&self) -> SyncMetadata {
        match self.kv.get(META_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored sync metadata unusable, resetting");
                SyncMetadata::default()
            }),
            Ok(None) => SyncMetadata::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read sync metadata");
                SyncMetadata::default()
            }
        }
    }

    pub async fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.metadata().await.last_sync_at
    }

    pub async fn last_filter(&self) -> Option<String> {
        self.metadata().await.last_filter
    }

    pub async fn set_last_filter(&self, filter: &str) -> Result<(), StoreError> {
        let mut meta = self.metadata().await;
        if meta.last_filter.as_deref() == Some(filter) {
            return Ok(());
        }
        meta.last_filter = Some(filter.to_string());
        self.kv.put(META_KEY, serde_json::to_string(&meta)?).await
    }

    /// Persist a merged collection together with its sync time, atomically.
    pub async fn commit_sync(
        &self,
        collection: &Collection,
        ids: &IdSequence,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut meta = self.metadata().await;
        meta.last_sync_at = Some(at);
        meta.last_local_id = Some(ids.last);
        self.write(collection, &meta).await
    }

    /// Reset the stored collection to the defaults and return them.
    ///
    /// `ids` is advanced past the default ids, never rewound.
    pub async fn clear(&self, ids: &mut IdSequence) -> Result<Collection, StoreError> {
        let defaults = default_collection();
        for id in defaults.ids() {
            ids.observe(id);
        }
        self.save(&defaults, ids).await?;
        Ok(defaults)
    }

    async fn write(&self, collection: &Collection, meta: &SyncMetadata) -> Result<(), StoreError> {
        let entries = [
            (QUOTES_KEY, encode(collection)?),
            (META_KEY, serde_json::to_string(meta)?),
        ];
        self.kv.put_all(&entries).await
    }
}

fn encode(collection: &Collection) -> Result<String, StoreError> {
    codec::encode(collection).map_err(|e| StoreError::Serialization(e.to_string()))
}
