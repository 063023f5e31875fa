//! Read-through snapshot cache.
//!
//! Consumer protocol (stale-while-revalidate): render [`CacheManager::read`]
//! immediately if it returns a snapshot, then await
//! [`CacheManager::revalidate`]. A successful fetch overwrites the snapshot;
//! a failed fetch keeps the stale value, and an error surfaces only when no
//! snapshot exists. There is no TTL and no coalescing of concurrent fetches
//! for the same key.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::warn;
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::storage::{StoreBackend, CACHE_COLLECTION};

/// Where the returned records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Network,
    Cache,
}

/// Records plus their provenance.
#[derive(Debug, Clone)]
pub struct CachedValue {
    pub records: JsonValue,
    pub source: CacheSource,
}

/// Owner of the cache collection. Snapshots are whole-value overwrites,
/// at most one per key; there is no field-level merge.
pub struct CacheManager {
    store: Arc<dyn StoreBackend>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn StoreBackend>) -> Self {
        Self { store }
    }

    /// Unconditionally overwrite the snapshot for `key`.
    pub async fn write(&self, key: &str, records: &JsonValue) -> SyncResult<()> {
        self.store.put(CACHE_COLLECTION, key, records).await
    }

    /// Last snapshot for `key`, or `None`.
    pub async fn read(&self, key: &str) -> SyncResult<Option<JsonValue>> {
        self.store.get(CACHE_COLLECTION, key).await
    }

    /// Fetch `url`, overwrite the snapshot on success, fall back to the
    /// stale snapshot on failure. The fetch error propagates only when no
    /// snapshot exists.
    pub async fn revalidate(
        &self,
        client: &reqwest::Client,
        key: &str,
        url: Url,
    ) -> SyncResult<CachedValue> {
        match self.fetch(client, url).await {
            Ok(records) => {
                // A failed cache write degrades to network-only behavior;
                // the fresh records are still returned.
                if let Err(err) = self.write(key, &records).await {
                    warn!("Cache write for '{}' failed: {}", key, err);
                }
                Ok(CachedValue {
                    records,
                    source: CacheSource::Network,
                })
            }
            Err(err) => {
                warn!("Revalidation of '{}' failed: {}", key, err);
                match self.read(key).await {
                    Ok(Some(records)) => Ok(CachedValue {
                        records,
                        source: CacheSource::Cache,
                    }),
                    _ => Err(err),
                }
            }
        }
    }

    async fn fetch(&self, client: &reqwest::Client, url: Url) -> SyncResult<JsonValue> {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}
