//! Durable outbox: the local queue of mutations not yet confirmed by the
//! server.
//!
//! Entries are immutable once enqueued; removal is the only mutation, and it
//! happens either after the sync engine receives a confirmed success for the
//! entry or on explicit user discard.

pub mod manager;
pub mod types;

pub use manager::OutboxManager;
pub use types::{HttpMethod, OutboxEntry, OutboxRequest};
