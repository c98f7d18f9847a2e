//! # Snapshot Writer
//!
//! Background task that persists cart snapshots one at a time.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Snapshot Writer                                  │
//! │                                                                         │
//! │  CartStore mutation                                                    │
//! │       │  (encode + publish + enqueue under one lock)                   │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────┐                              │
//! │  │  mpsc queue (unbounded, FIFO)        │                              │
//! │  │  Save{rev 1} Save{rev 2} Flush ...   │                              │
//! │  └──────────────────────────────────────┘                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Writer task (single consumer)                                         │
//! │    • coalesce: skip Saves superseded by a newer queued Save            │
//! │    • storage.set(key, payload)                                         │
//! │    • failure: log + count, keep running                                │
//! │    • Flush: ack once everything queued before it is written            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  watch::Sender<PersistenceStatus>                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A single consumer drains the queue, so writes reach storage in the order
//! mutations happened and the last write is always the latest snapshot.

use std::collections::VecDeque;
use std::sync::Arc;

use gomarket_db::KeyValueStore;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Work items for the writer task.
#[derive(Debug)]
pub(crate) enum WriteJob {
    /// Persist an encoded snapshot.
    Save { revision: u64, payload: String },

    /// Acknowledge once every earlier job has been handled.
    Flush(oneshot::Sender<()>),
}

/// Outcome counters for background persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceStatus {
    /// Revision of the newest snapshot written successfully (0 = none yet).
    pub persisted_revision: u64,

    /// Successful writes.
    pub writes: u64,

    /// Failed writes.
    pub failures: u64,

    /// Saves skipped because a newer snapshot was already queued.
    pub skipped: u64,

    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
}

impl PersistenceStatus {
    /// Returns true if the most recent write attempt failed.
    pub fn is_degraded(&self) -> bool {
        self.last_error.is_some()
    }
}

/// Starts the writer task.
///
/// The task runs until every sender is dropped and the queue is drained.
pub(crate) fn spawn(
    storage: Arc<dyn KeyValueStore>,
    key: String,
    coalesce: bool,
) -> (
    mpsc::UnboundedSender<WriteJob>,
    watch::Receiver<PersistenceStatus>,
    JoinHandle<()>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(PersistenceStatus::default());

    let writer = SnapshotWriter {
        storage,
        key,
        coalesce,
        jobs: rx,
        pending: VecDeque::new(),
        status: status_tx,
    };

    let handle = tokio::spawn(writer.run());
    (tx, status_rx, handle)
}

struct SnapshotWriter {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    coalesce: bool,
    jobs: mpsc::UnboundedReceiver<WriteJob>,
    /// Jobs pulled off the queue while coalescing but not yet handled.
    pending: VecDeque<WriteJob>,
    status: watch::Sender<PersistenceStatus>,
}

impl SnapshotWriter {
    async fn run(mut self) {
        info!(key = %self.key, coalesce = self.coalesce, "Snapshot writer started");

        while let Some(job) = self.next_job().await {
            match job {
                WriteJob::Save { revision, payload } => {
                    let (revision, payload) = if self.coalesce {
                        self.newest_save(revision, payload)
                    } else {
                        (revision, payload)
                    };
                    self.write(revision, &payload).await;
                }
                WriteJob::Flush(ack) => {
                    // Receiver may have given up waiting
                    let _ = ack.send(());
                }
            }
        }

        info!(key = %self.key, "Snapshot writer stopped");
    }

    async fn next_job(&mut self) -> Option<WriteJob> {
        match self.pending.pop_front() {
            Some(job) => Some(job),
            None => self.jobs.recv().await,
        }
    }

    /// Pulls already-queued Saves that supersede the given one.
    ///
    /// Stops at the first Flush so a flush never acks before the snapshots
    /// queued ahead of it are written.
    fn newest_save(&mut self, mut revision: u64, mut payload: String) -> (u64, String) {
        let mut skipped = 0u64;

        while self.pending.is_empty() {
            match self.jobs.try_recv() {
                Ok(WriteJob::Save {
                    revision: next_revision,
                    payload: next_payload,
                }) => {
                    revision = next_revision;
                    payload = next_payload;
                    skipped += 1;
                }
                Ok(flush @ WriteJob::Flush(_)) => self.pending.push_back(flush),
                Err(_) => break,
            }
        }

        if skipped > 0 {
            debug!(skipped, revision, "Coalesced superseded snapshots");
            self.status.send_modify(|status| status.skipped += skipped);
        }

        (revision, payload)
    }

    async fn write(&self, revision: u64, payload: &str) {
        match self.storage.set(&self.key, payload).await {
            Ok(()) => {
                debug!(revision, bytes = payload.len(), "Cart snapshot persisted");
                self.status.send_modify(|status| {
                    status.persisted_revision = revision;
                    status.writes += 1;
                    status.last_error = None;
                });
            }
            Err(e) => {
                error!(revision, error = %e, "Failed to persist cart snapshot");
                self.status.send_modify(|status| {
                    status.failures += 1;
                    status.last_error = Some(e.to_string());
                });
            }
        }
    }
}
