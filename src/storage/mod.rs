//! Durable key-value storage for the outbox and cache collections.
//!
//! The backend is an injectable trait so screens, managers and tests can run
//! against the embedded RocksDB store, the in-memory store, or a fake. When
//! durable storage cannot be opened (restricted storage contexts), callers
//! fall back to [`MemoryStore`] and keep working without durability.

pub mod engine;
pub mod memory;

pub use engine::RocksStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::SyncResult;

/// Collection holding queued outbox mutations.
pub const OUTBOX_COLLECTION: &str = "outbox";

/// Collection holding cached read snapshots.
pub const CACHE_COLLECTION: &str = "cache";

/// Narrow persistence contract shared by the outbox and cache managers.
///
/// Collections are auto-provisioned on first use. Implementations surface
/// failures to the caller instead of crashing; every consumer of this trait
/// treats storage errors as non-fatal and degrades to network-only or
/// in-memory-only behavior.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Write one value under `key`, overwriting any previous value.
    async fn put(&self, collection: &str, key: &str, value: &JsonValue) -> SyncResult<()>;

    /// Read the value stored under `key`, if any.
    async fn get(&self, collection: &str, key: &str) -> SyncResult<Option<JsonValue>>;

    /// Read every value in the collection. Order is unspecified.
    async fn get_all(&self, collection: &str) -> SyncResult<Vec<JsonValue>>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    async fn delete(&self, collection: &str, key: &str) -> SyncResult<()>;
}
