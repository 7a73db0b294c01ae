//! Progress reporting for sync passes.

use crate::entity::collection::Collection;
use crate::store::PersistResult;

use super::types::{JobCounts, SyncKind};

/// Progress events emitted during a sync pass or ingest.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// A pass over several jobs is starting.
    PassStarted { jobs: usize },

    /// A job moved from pending to running.
    JobStarted { kind: SyncKind },

    /// A listing was fetched and split.
    Fetched { kind: SyncKind, items: usize },

    /// One record was written.
    Persisted {
        collection: Collection,
        key: String,
        outcome: PersistResult,
    },

    /// One item could not be normalized or persisted. The job continues.
    ItemFailed {
        collection: Collection,
        /// Natural key, when normalization got far enough to know it.
        key: Option<String>,
        reason: &'static str,
        error: String,
    },

    /// A transient failure is being retried.
    RetryBackoff {
        label: String,
        retry_after_ms: u64,
        attempt: u32,
        error: String,
    },

    /// A job finished, with or without item-level failures.
    JobSucceeded { kind: SyncKind, counts: JobCounts },

    /// A job failed as a whole.
    JobFailed {
        kind: SyncKind,
        reason: &'static str,
        error: String,
    },

    /// The pass finished.
    PassComplete { succeeded: usize, failed: usize },
}

/// Callback for progress updates.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
