//! Sync orchestrator.
//!
//! A pass runs the five jobs in [`SyncKind::ALL`] order, one at a time. Each
//! job fetches its listing, splits it, normalizes every item and upserts it.
//! A fetch or listing failure fails that job only; the pass always attempts
//! every job and always returns a report.
//!
//! # Example
//!
//! ```ignore
//! use pitchside::sync::{Orchestrator, SyncOptions};
//!
//! let orchestrator = Orchestrator::new(client, Arc::new(db)).with_options(SyncOptions::default().with_retries(3));
//! let report = orchestrator.run_all(None).await;
//! for job in &report.jobs {
//!     println!("{}: {} {}", job.kind, job.state, job.message);
//! }
//! ```

mod ingest;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::Value;

pub use ingest::{IngestOutcome, ingest};

use super::error::{Result, SyncError};
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{JobReport, JobState, SyncKind, SyncOptions, SyncReport};
use crate::entity::collection::Collection;
use crate::normalize::{self, listing};
use crate::provider::{Endpoint, ProviderClient, ProviderError, short_error_message};
use crate::retry::with_retry;
use crate::store::{self, PersistResult};

/// Runs sync jobs against one provider client and one document store.
///
/// Clones share the client's rate limiter and the database connection.
#[derive(Clone)]
pub struct Orchestrator {
    client: ProviderClient,
    db: Arc<DatabaseConnection>,
    options: SyncOptions,
}

impl Orchestrator {
    pub fn new(client: ProviderClient, db: Arc<DatabaseConnection>) -> Self {
        Self {
            client,
            db,
            options: SyncOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Run every job in order.
    pub async fn run_all(&self, on_progress: Option<&ProgressCallback>) -> SyncReport {
        self.run_jobs(&SyncKind::ALL, on_progress).await
    }

    /// Run the given jobs in order, each isolated from the others' failures.
    pub async fn run_jobs(
        &self,
        kinds: &[SyncKind],
        on_progress: Option<&ProgressCallback>,
    ) -> SyncReport {
        let started = Instant::now();
        let mut report = SyncReport::new(Utc::now());
        emit(on_progress, SyncProgress::PassStarted { jobs: kinds.len() });

        for &kind in kinds {
            let job = self.run_job(kind, on_progress).await;
            report.jobs.push(job);
        }

        report.duration = started.elapsed();
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            duration_ms = report.duration.as_millis() as u64,
            "Sync pass complete"
        );
        emit(
            on_progress,
            SyncProgress::PassComplete {
                succeeded: report.succeeded(),
                failed: report.failed(),
            },
        );
        report
    }

    /// Run a single job. Never fails; failures land in the returned report.
    pub async fn run_job(
        &self,
        kind: SyncKind,
        on_progress: Option<&ProgressCallback>,
    ) -> JobReport {
        let started = Instant::now();
        let mut report = JobReport::pending(kind);
        report.state = JobState::Running;
        emit(on_progress, SyncProgress::JobStarted { kind });
        tracing::debug!(job = %kind, "Sync job started");

        match self.execute(kind, &mut report, on_progress).await {
            Ok(()) => {
                report.succeed(started.elapsed());
                tracing::info!(
                    job = %kind,
                    fetched = report.counts.fetched,
                    inserted = report.counts.inserted,
                    updated = report.counts.updated,
                    failed = report.counts.failed,
                    "Sync job succeeded"
                );
                emit(
                    on_progress,
                    SyncProgress::JobSucceeded {
                        kind,
                        counts: report.counts,
                    },
                );
            }
            Err(e) => {
                report.fail(e.reason(), e.to_string(), started.elapsed());
                tracing::warn!(job = %kind, reason = e.reason(), error = %e, "Sync job failed");
                emit(
                    on_progress,
                    SyncProgress::JobFailed {
                        kind,
                        reason: e.reason(),
                        error: e.short_message(),
                    },
                );
            }
        }

        report
    }

    async fn execute(
        &self,
        kind: SyncKind,
        report: &mut JobReport,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<()> {
        let payload = self
            .fetch(&kind.endpoint(), kind.as_str(), on_progress)
            .await?;

        let collection = kind.collection();
        let items = listing::split_listing(collection, &payload)?;
        emit(
            on_progress,
            SyncProgress::Fetched {
                kind,
                items: items.len(),
            },
        );

        let outcome =
            ingest::persist_items(&self.db, collection, &items, &self.options, on_progress).await;
        report.counts = outcome.counts;
        report.errors = outcome.errors;
        Ok(())
    }

    pub async fn sync_teams(&self, on_progress: Option<&ProgressCallback>) -> JobReport {
        self.run_job(SyncKind::Teams, on_progress).await
    }

    pub async fn sync_news(&self, on_progress: Option<&ProgressCallback>) -> JobReport {
        self.run_job(SyncKind::News, on_progress).await
    }

    pub async fn sync_matches_recent(&self, on_progress: Option<&ProgressCallback>) -> JobReport {
        self.run_job(SyncKind::MatchesRecent, on_progress).await
    }

    pub async fn sync_matches_upcoming(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> JobReport {
        self.run_job(SyncKind::MatchesUpcoming, on_progress).await
    }

    pub async fn sync_series(&self, on_progress: Option<&ProgressCallback>) -> JobReport {
        self.run_job(SyncKind::Series, on_progress).await
    }

    /// Fetch and store one player profile.
    ///
    /// # Errors
    /// Provider, normalization and store errors are returned as-is.
    pub async fn sync_player(&self, id: &str) -> Result<PersistResult> {
        self.sync_entity(Collection::Players, Endpoint::Player(id.to_string()))
            .await
    }

    /// Fetch and store one photo's metadata.
    ///
    /// # Errors
    /// Provider, normalization and store errors are returned as-is.
    pub async fn sync_photo(&self, id: &str) -> Result<PersistResult> {
        self.sync_entity(Collection::Photos, Endpoint::Photo(id.to_string()))
            .await
    }

    async fn sync_entity(&self, collection: Collection, endpoint: Endpoint) -> Result<PersistResult> {
        let label = endpoint.to_string();
        let payload = self.fetch(&endpoint, &label, None).await?;
        let record = normalize::normalize(collection, &payload)?;
        let outcome = store::upsert_with_retry(
            &self.db,
            &record,
            self.options.upsert_retries,
            self.options.upsert_backoff_ms,
        )
        .await
        .map_err(SyncError::from)?;
        tracing::info!(collection = %collection, key = %record.natural_key(), outcome = ?outcome, "Synced entity");
        Ok(outcome)
    }

    /// Fetch once, or under the retry policy when one is configured.
    async fn fetch(
        &self,
        endpoint: &Endpoint,
        label: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> std::result::Result<Value, ProviderError> {
        match &self.options.retry {
            Some(config) => {
                with_retry(
                    || self.client.fetch(endpoint, &[]),
                    ProviderError::is_transient,
                    short_error_message,
                    label,
                    config,
                    on_progress,
                )
                .await
            }
            None => self.client.fetch(endpoint, &[]).await,
        }
    }
}
