pub mod cache;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod outbox;
pub mod reachability;
pub mod storage;
pub mod sync;

pub use cache::{CacheManager, CacheSource, CachedValue};
pub use dispatch::{Attachment, Dispatcher, Disposition, WriteRequest};
pub use error::{SyncError, SyncResult};
pub use outbox::{HttpMethod, OutboxEntry, OutboxManager, OutboxRequest};
pub use reachability::Reachability;
pub use storage::{MemoryStore, RocksStore, StoreBackend, CACHE_COLLECTION, OUTBOX_COLLECTION};
pub use sync::{EntryStatus, SkipReason, SyncConfig, SyncEngine, SyncEvent, SyncReport, SyncState};
