//! Cloud synchronization for the local record store.
//!
//! One sync attempt is a full-state push: the exporter snapshots every
//! in-scope table (synced rows included), the engine transmits the snapshot
//! to the remote endpoint, and on acknowledgment marks exactly the rows that
//! were unsynced at snapshot time. The endpoint keeps only the latest
//! snapshot per device, so re-sends are cheap and idempotent.

mod client;
mod engine;
mod export;
mod protocol;
mod scheduler;

pub use client::{check_server, HttpTransport, SyncTransport};
pub use engine::{SyncEngine, SyncOutcome, SyncState, SyncStatus};
pub use export::export_all;
pub use protocol::{SnapshotPayload, SyncAck, SyncRequest, UnsyncedIds};
pub use scheduler::{ConnectivityWatcher, SyncScheduler};

use thiserror::Error;

use crate::db::StoreError;

/// Errors that can occur during a sync attempt.
///
/// These never escape the scheduler loop: the engine absorbs them into its
/// status and error fields so one failed attempt cannot kill the schedule.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Sync is not configured (no server URL).
    #[error("sync not configured: add server_url to the config file")]
    NotConfigured,
    /// Network-level failure reaching the endpoint.
    #[error("transport error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success HTTP status.
    #[error("endpoint returned HTTP {0}")]
    Endpoint(u16),
    /// The endpoint answered 2xx but did not acknowledge the snapshot.
    #[error("endpoint rejected snapshot: {0}")]
    Rejected(String),
    /// Local store failure while exporting or reconciling.
    #[error(transparent)]
    Store(#[from] StoreError),
}
