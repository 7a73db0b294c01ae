//! Sync job types and constants.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::collection::Collection;
use crate::provider::Endpoint;
use crate::retry::RetryConfig;
use crate::store::{DEFAULT_UPSERT_BACKOFF_MS, DEFAULT_UPSERT_RETRIES};

/// Maximum backoff delay in milliseconds between job retries.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Maximum retries for a single job fetch when retry is enabled.
pub const MAX_JOB_RETRIES: u32 = 5;

/// One of the five scheduled sync jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncKind {
    Teams,
    News,
    MatchesRecent,
    MatchesUpcoming,
    Series,
}

impl SyncKind {
    /// Every job, in the order a full pass runs them.
    pub const ALL: [SyncKind; 5] = [
        SyncKind::Teams,
        SyncKind::News,
        SyncKind::MatchesRecent,
        SyncKind::MatchesUpcoming,
        SyncKind::Series,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncKind::Teams => "teams",
            SyncKind::News => "news",
            SyncKind::MatchesRecent => "matches-recent",
            SyncKind::MatchesUpcoming => "matches-upcoming",
            SyncKind::Series => "series",
        }
    }

    /// Provider endpoint the job fetches.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            SyncKind::Teams => Endpoint::Teams,
            SyncKind::News => Endpoint::News,
            SyncKind::MatchesRecent => Endpoint::MatchesRecent,
            SyncKind::MatchesUpcoming => Endpoint::MatchesUpcoming,
            SyncKind::Series => Endpoint::Series,
        }
    }

    /// Collection the job writes to.
    pub fn collection(&self) -> Collection {
        match self {
            SyncKind::Teams => Collection::Teams,
            SyncKind::News => Collection::News,
            SyncKind::MatchesRecent | SyncKind::MatchesUpcoming => Collection::Matches,
            SyncKind::Series => Collection::Series,
        }
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "teams" => Ok(SyncKind::Teams),
            "news" => Ok(SyncKind::News),
            "matches-recent" | "recent" => Ok(SyncKind::MatchesRecent),
            "matches-upcoming" | "upcoming" => Ok(SyncKind::MatchesUpcoming),
            "series" => Ok(SyncKind::Series),
            _ => Err(format!("Unknown sync job: {}", s)),
        }
    }
}

/// Lifecycle of a job within one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Item counts for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    /// Items produced by the listing splitter.
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Items that failed to normalize or persist.
    pub failed: usize,
}

/// Outcome of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub kind: SyncKind,
    pub state: JobState,
    pub succeeded: bool,
    pub message: String,
    /// Taxonomy name of the failure, set only when the job failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub counts: JobCounts,
    /// Item-level errors that did not fail the job.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl JobReport {
    pub fn pending(kind: SyncKind) -> Self {
        Self {
            kind,
            state: JobState::Pending,
            succeeded: false,
            message: String::new(),
            reason: None,
            counts: JobCounts::default(),
            errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn succeed(&mut self, duration: Duration) {
        self.state = JobState::Succeeded;
        self.succeeded = true;
        self.duration = duration;
        let c = &self.counts;
        self.message = format!(
            "fetched {}, inserted {}, updated {}, failed {}",
            c.fetched, c.inserted, c.updated, c.failed
        );
    }

    pub(crate) fn fail(&mut self, reason: &str, message: String, duration: Duration) {
        self.state = JobState::Failed;
        self.succeeded = false;
        self.reason = Some(reason.to_string());
        self.message = message;
        self.duration = duration;
    }
}

/// Outcome of a pass over one or more jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub jobs: Vec<JobReport>,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl SyncReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            jobs: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn job(&self, kind: SyncKind) -> Option<&JobReport> {
        self.jobs.iter().find(|j| j.kind == kind)
    }

    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.state == JobState::Failed)
            .count()
    }

    /// True if any job failed or any item inside a job failed.
    pub fn has_failures(&self) -> bool {
        self.jobs
            .iter()
            .any(|j| j.state == JobState::Failed || j.counts.failed > 0)
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Options for a sync pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Retry transient fetch failures. Off by default.
    pub retry: Option<RetryConfig>,
    /// Retries for transient database errors per upsert.
    pub upsert_retries: u32,
    /// Initial backoff between upsert retries.
    pub upsert_backoff_ms: u64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            retry: None,
            upsert_retries: DEFAULT_UPSERT_RETRIES,
            upsert_backoff_ms: DEFAULT_UPSERT_BACKOFF_MS,
        }
    }
}

impl SyncOptions {
    /// Enable fetch retries with `max_retries` attempts; zero disables them.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.retry = (max_retries > 0).then(|| RetryConfig::with_max_retries(max_retries as usize));
        self
    }
}
