//! Outbox replay engine.
//!
//! A pass snapshots the queue, sorts it ascending by creation time and
//! replays entries strictly sequentially. An entry is deleted only after the
//! server confirms success; anything else leaves it queued for a later pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::state::{EntryStatus, SyncState};
use crate::error::{SyncError, SyncResult};
use crate::http;
use crate::outbox::{OutboxEntry, OutboxManager};
use crate::reachability::Reachability;

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL recorded entry URLs are resolved against
    pub base_url: Option<Url>,
    /// Per-request timeout; an elapsed timeout counts as a retryable failure
    pub request_timeout: Duration,
    /// Pause between entries to avoid bursting the backend
    pub inter_entry_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: Duration::from_secs(30),
            inter_entry_delay: Duration::from_millis(500),
        }
    }
}

/// Why a requested pass did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    AlreadyRunning,
}

/// Outcome of one [`SyncEngine::sync_all`] invocation.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Set when the pass did not run at all; counters are zero.
    pub skipped: Option<SkipReason>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Entries still queued after the pass, reloaded from the store.
    pub remaining: usize,
}

impl SyncReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            attempted: 0,
            succeeded: 0,
            failed: 0,
            remaining: 0,
        }
    }
}

/// Replays the outbox against the backend.
///
/// Holds the pass lock (re-entrancy guard) and the transient status state.
/// Mutations are assumed idempotent on the backend; replay is at-least-once.
pub struct SyncEngine {
    outbox: Arc<OutboxManager>,
    state: Arc<SyncState>,
    reachability: Reachability,
    client: reqwest::Client,
    config: SyncConfig,
    /// Owned by this engine; `try_lock` failure means a pass is in flight.
    pass_lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        outbox: Arc<OutboxManager>,
        reachability: Reachability,
        config: SyncConfig,
    ) -> SyncResult<Self> {
        let client = http::build_client(config.request_timeout)?;
        Ok(Self {
            outbox,
            state: Arc::new(SyncState::new()),
            reachability,
            client,
            config,
            pass_lock: Mutex::new(()),
        })
    }

    /// Transient status state, for UI badges and event subscriptions.
    pub fn state(&self) -> Arc<SyncState> {
        Arc::clone(&self.state)
    }

    /// Whether a pass is currently in flight.
    pub fn is_syncing(&self) -> bool {
        self.pass_lock.try_lock().is_err()
    }

    /// Run one sync pass. No-op (with a skip reason) when offline or when a
    /// pass is already running. Per-entry failures are reported through the
    /// status state and the returned counters, never as an `Err`.
    pub async fn sync_all(&self) -> SyncResult<SyncReport> {
        let _pass = match self.pass_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Sync pass already running, skipping");
                return Ok(SyncReport::skipped(SkipReason::AlreadyRunning));
            }
        };

        if !self.reachability.is_online() {
            debug!("Offline, skipping sync pass");
            return Ok(SyncReport::skipped(SkipReason::Offline));
        }

        // Snapshot in causal order; entries enqueued from here on wait for
        // the next pass.
        let mut snapshot = self.outbox.list().await?;
        snapshot.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        self.state.reset();
        info!("Starting sync pass over {} entries", snapshot.len());

        let mut report = SyncReport {
            skipped: None,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            remaining: 0,
        };

        let last = snapshot.len().saturating_sub(1);
        for (index, entry) in snapshot.iter().enumerate() {
            report.attempted += 1;
            match self.replay(entry).await {
                Ok(()) => report.succeeded += 1,
                Err(err) => {
                    warn!("Entry {} ('{}') failed: {}", entry.id, entry.label, err);
                    report.failed += 1;
                }
            }
            if index < last {
                tokio::time::sleep(self.config.inter_entry_delay).await;
            }
        }

        report.remaining = self.outbox.list().await?.len();
        info!(
            "Sync pass finished: {}/{} replayed, {} still queued",
            report.succeeded, report.attempted, report.remaining
        );
        Ok(report)
    }

    /// Remove an entry at the user's request. Refused while a pass runs so
    /// an in-flight entry cannot be deleted out from under the engine.
    pub async fn discard(&self, id: &str) -> SyncResult<()> {
        let _pass = self
            .pass_lock
            .try_lock()
            .map_err(|_| SyncError::SyncInProgress)?;
        self.outbox.remove(id).await
    }

    /// Spawn a task that runs a pass on every offline-to-online transition.
    pub fn spawn_on_reconnect(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let mut online = self.reachability.subscribe();
        tokio::spawn(async move {
            let mut was_online = *online.borrow();
            while online.changed().await.is_ok() {
                let is_online = *online.borrow_and_update();
                if is_online && !was_online {
                    info!("Connectivity restored, starting sync pass");
                    if let Err(err) = self.sync_all().await {
                        warn!("Reconnect sync failed: {}", err);
                    }
                }
                was_online = is_online;
            }
        })
    }

    /// Replay a single entry: exactly one attempt per pass.
    async fn replay(&self, entry: &OutboxEntry) -> SyncResult<()> {
        self.state.set(&entry.id, EntryStatus::Syncing);

        match self.attempt(entry).await {
            Ok(()) => {
                self.state.set(&entry.id, EntryStatus::Success);
                // Delete only now that the server has confirmed the write
                self.outbox.remove(&entry.id).await?;
                Ok(())
            }
            Err(SyncError::Http { status }) => {
                self.state.set(&entry.id, EntryStatus::Rejected { status });
                Err(SyncError::Http { status })
            }
            Err(err) => {
                self.state.set(&entry.id, EntryStatus::Unreachable);
                Err(err)
            }
        }
    }

    async fn attempt(&self, entry: &OutboxEntry) -> SyncResult<()> {
        let target = http::resolve_url(self.config.base_url.as_ref(), &entry.url)?;
        debug!("Replaying {} {} ('{}')", entry.method, target, entry.label);

        let response = self
            .client
            .request(entry.method.into(), target)
            .json(&entry.body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SyncError::Http {
                status: status.as_u16(),
            })
        }
    }
}
