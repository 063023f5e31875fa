use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{StoreBackend, CACHE_COLLECTION, OUTBOX_COLLECTION};
use crate::error::{SyncError, SyncResult};

/// Durable store backed by RocksDB, one column family per collection.
pub struct RocksStore {
    db: DB,
    path: PathBuf,
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore").field("path", &self.path).finish()
    }
}

impl RocksStore {
    /// Open (or create) the store at `data_dir`.
    ///
    /// The outbox and cache collections are provisioned on first open. An
    /// open failure is returned as [`SyncError::StorageUnavailable`] so the
    /// caller can degrade to an in-memory store.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> SyncResult<Self> {
        let path = data_dir.as_ref().to_path_buf();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        // Limit WAL size to prevent unbounded disk growth on long-offline
        // devices.
        opts.set_max_total_wal_size(16 * 1024 * 1024);
        opts.set_keep_log_file_num(5);

        // Get existing column families or start from default
        let cf_names = match DB::list_cf(&opts, &path) {
            Ok(cfs) => cfs,
            Err(_) => vec!["default".to_string()],
        };

        // Ensure both collections exist
        let mut cf_names: Vec<String> = cf_names.into_iter().collect();
        for collection in [OUTBOX_COLLECTION, CACHE_COLLECTION] {
            if !cf_names.iter().any(|name| name == collection) {
                cf_names.push(collection.to_string());
            }
        }

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = cf_names
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, &path, cf_descriptors)
            .map_err(|e| SyncError::StorageUnavailable(format!("Failed to open RocksDB: {}", e)))?;

        Ok(Self { db, path })
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.path
    }

    fn cf(&self, collection: &str) -> SyncResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(collection)
            .ok_or_else(|| SyncError::Storage(format!("Unknown collection '{}'", collection)))
    }
}

#[async_trait]
impl StoreBackend for RocksStore {
    async fn put(&self, collection: &str, key: &str, value: &JsonValue) -> SyncResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(self.cf(collection)?, key.as_bytes(), bytes)?;
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> SyncResult<Option<JsonValue>> {
        match self.db.get_cf(self.cf(collection)?, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self, collection: &str) -> SyncResult<Vec<JsonValue>> {
        let mut values = Vec::new();
        for item in self.db.iterator_cf(self.cf(collection)?, IteratorMode::Start) {
            let (key, bytes) = item?;
            match serde_json::from_slice(&bytes) {
                Ok(value) => values.push(value),
                Err(e) => {
                    // Skip rather than fail the whole read
                    tracing::error!(
                        "Corrupted value in '{}' at key {}: {}",
                        collection,
                        String::from_utf8_lossy(&key),
                        e
                    );
                }
            }
        }
        Ok(values)
    }

    async fn delete(&self, collection: &str, key: &str) -> SyncResult<()> {
        self.db.delete_cf(self.cf(collection)?, key.as_bytes())?;
        Ok(())
    }
}
