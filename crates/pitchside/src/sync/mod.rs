//! Sync orchestration: fetch, normalize and persist provider data.
//!
//! # Module Structure
//!
//! - [`types`] - Jobs and reports: `SyncKind`, `JobReport`, `SyncReport`, `SyncOptions`
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - The `Orchestrator` and payload `ingest()`
//!
//! # Example
//!
//! ```ignore
//! use pitchside::sync::{Orchestrator, SyncKind};
//!
//! let orchestrator = Orchestrator::new(client, db);
//! let report = orchestrator.run_job(SyncKind::News, None).await;
//! if report.reason.as_deref() == Some("RateLimited") {
//!     // back off before the next pass
//! }
//! ```

pub mod engine;
mod error;
mod progress;
mod types;

pub use error::{Result, SyncError};

pub use types::{JobCounts, JobReport, JobState, SyncKind, SyncOptions, SyncReport};

pub use types::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_JOB_RETRIES};

pub use progress::{ProgressCallback, SyncProgress, emit};

pub use engine::{IngestOutcome, Orchestrator, ingest};
