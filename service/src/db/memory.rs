//! In-memory key-value store for ephemeral runs and tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::db::KeyValueStore;
use crate::error::StoreError;

/// Key-value store held in a `DashMap`.
///
/// Reads and writes can be switched to fail, to exercise the degraded paths
/// of the store and orchestrator.
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: DashMap<String, String>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    batches: AtomicUsize,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value without going through the store.
    pub fn with_value(self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of batches committed so far.
    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    /// Raw stored value, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value().clone())
    }
}

impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        Ok(self.raw(key))
    }

    async fn put_all(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        for (key, value) in entries {
            self.values.insert((*key).to_string(), value.clone());
        }
        self.batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip_and_failure_injection() {
        let kv = MemoryKv::new();
        kv.put("k", "v".to_string()).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(kv.batches(), 1);

        kv.set_fail_writes(true);
        assert!(kv.put("k", "w".to_string()).await.is_err());
        assert_eq!(kv.raw("k").as_deref(), Some("v"));

        kv.set_fail_reads(true);
        assert!(kv.get("k").await.is_err());
    }
}
