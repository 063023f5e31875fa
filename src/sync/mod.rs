//! Outbox synchronization
//!
//! This module provides:
//! - Sequential replay of queued mutations in creation order
//! - Partial-failure isolation: one failed entry never aborts the batch
//! - Re-entrancy control: at most one pass at a time
//! - Transient per-entry status with broadcast events
//! - Reconnect-triggered passes
//!
//! Replayed mutations are assumed idempotent on the backend. Delivery is
//! at-least-once: an entry that fails stays queued and is attempted again on
//! a later pass, never twice within the same pass.

pub mod engine;
pub mod state;

pub use engine::{SkipReason, SyncConfig, SyncEngine, SyncReport};
pub use state::{EntryStatus, SyncEvent, SyncState};
