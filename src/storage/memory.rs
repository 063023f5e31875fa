//! In-memory store for tests and degraded (no-durability) operation.

use std::collections::HashMap;
use tokio::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::StoreBackend;
use crate::error::SyncResult;

/// Volatile [`StoreBackend`] holding collections in a `HashMap`.
///
/// Used as the fallback when [`super::RocksStore`] cannot be opened, and as
/// the substitute backend in tests. Data does not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, JsonValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn put(&self, collection: &str, key: &str, value: &JsonValue) -> SyncResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> SyncResult<Option<JsonValue>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn get_all(&self, collection: &str) -> SyncResult<Vec<JsonValue>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, key: &str) -> SyncResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(entries) = collections.get_mut(collection) {
            entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let store = MemoryStore::new();
        store.put("outbox", "a", &json!({"n": 1})).await.unwrap();
        assert_eq!(store.get("outbox", "a").await.unwrap(), Some(json!({"n": 1})));

        store.delete("outbox", "a").await.unwrap();
        assert_eq!(store.get("outbox", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn collections_provision_on_first_use() {
        let store = MemoryStore::new();
        assert!(store.get_all("cache").await.unwrap().is_empty());

        store.put("cache", "k", &json!([1, 2])).await.unwrap();
        assert_eq!(store.get_all("cache").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.delete("outbox", "nope").await.unwrap();
    }
}
