//! Key-value access used by the local store.

use std::future::Future;
use std::sync::Arc;

use crate::db::Pool;
use crate::error::StoreError;

/// Whole-value key-value storage.
///
/// Values are opaque strings that are always overwritten in full. A batch
/// passed to [`KeyValueStore::put_all`] is applied atomically.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Write every entry, or none of them.
    fn put_all(
        &self,
        entries: &[(&str, String)],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Write a single entry.
    fn put(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move { self.put_all(&[(key, value)]).await }
    }
}

/// A shared store, so one backend can sit behind several front-ends.
impl<K: KeyValueStore> KeyValueStore for Arc<K> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn put_all(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        (**self).put_all(entries).await
    }
}

/// SQLite-backed key-value store.
#[derive(Debug, Clone)]
pub struct SqliteKv {
    pool: Pool,
}

impl SqliteKv {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for SqliteKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn put_all(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO kv (key, value, updated_at)
                VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                ON CONFLICT (key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(value.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::trace!(keys = entries.len(), "Committed key-value batch");
        Ok(())
    }
}
