//! Transient sync status tracking.
//!
//! Statuses exist only while the process runs and are reset at the start of
//! every pass; after a restart a previously failed entry simply shows as
//! pending again. Nothing here is persisted.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;

/// Per-entry status during an active sync pass.
///
/// Server rejections and transport failures are kept distinct so UIs can
/// tell them apart, even though the engine retries both kinds alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Syncing,
    Success,
    /// The server answered outside 2xx; the entry stays queued.
    Rejected { status: u16 },
    /// The request never completed (timeout, connection failure); the entry
    /// stays queued.
    Unreachable,
}

/// Status change for one entry, broadcast to UI subscribers.
#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub entry_id: String,
    pub status: EntryStatus,
}

/// Owner of the in-memory status map and the event channel. Held by the
/// sync engine; queried by screens for badges.
pub struct SyncState {
    statuses: RwLock<HashMap<String, EntryStatus>>,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncState {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(100);
        Self {
            statuses: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn status_of(&self, entry_id: &str) -> Option<EntryStatus> {
        self.statuses.read().get(entry_id).cloned()
    }

    /// Snapshot of every tracked status.
    pub fn statuses(&self) -> HashMap<String, EntryStatus> {
        self.statuses.read().clone()
    }

    pub(crate) fn set(&self, entry_id: &str, status: EntryStatus) {
        self.statuses
            .write()
            .insert(entry_id.to_string(), status.clone());
        // Nobody listening is fine
        let _ = self.events.send(SyncEvent {
            entry_id: entry_id.to_string(),
            status,
        });
    }

    pub(crate) fn reset(&self) {
        self.statuses.write().clear();
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}
