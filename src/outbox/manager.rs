use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::types::{OutboxEntry, OutboxRequest};
use crate::error::SyncResult;
use crate::storage::{StoreBackend, OUTBOX_COLLECTION};

/// Owner of the outbox collection. All queue access goes through this type;
/// nothing else touches the store's outbox collection directly.
pub struct OutboxManager {
    store: Arc<dyn StoreBackend>,
}

impl OutboxManager {
    pub fn new(store: Arc<dyn StoreBackend>) -> Self {
        Self { store }
    }

    /// Assign `id` and `createdAt` and durably write exactly one entry.
    /// Returns the generated id.
    pub async fn enqueue(&self, request: OutboxRequest) -> SyncResult<String> {
        let entry = OutboxEntry {
            id: Uuid::new_v4().to_string(),
            url: request.url,
            method: request.method,
            body: request.body,
            label: request.label,
            kind: request.kind,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&entry)?;
        self.store.put(OUTBOX_COLLECTION, &entry.id, &value).await?;

        tracing::debug!("Queued '{}' ({} {})", entry.label, entry.method, entry.url);
        Ok(entry.id)
    }

    /// All queued entries, newest first (display order). The sync engine
    /// re-sorts ascending by `createdAt` before replay.
    pub async fn list(&self) -> SyncResult<Vec<OutboxEntry>> {
        let mut entries = Vec::new();
        for value in self.store.get_all(OUTBOX_COLLECTION).await? {
            match serde_json::from_value::<OutboxEntry>(value) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::error!("Corrupted outbox entry, skipping: {}", e);
                }
            }
        }
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Delete the entry with `id` if present. Idempotent: removing a missing
    /// id is not an error.
    pub async fn remove(&self, id: &str) -> SyncResult<()> {
        self.store.delete(OUTBOX_COLLECTION, id).await
    }
}
