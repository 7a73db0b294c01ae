use pitchside::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::PassStarted { jobs } => {
                tracing::info!(jobs, "Starting sync pass");
            }

            SyncProgress::JobStarted { kind } => {
                tracing::info!(job = %kind, "Running job");
            }

            SyncProgress::Fetched { kind, items } => {
                tracing::info!(job = %kind, items, "Fetched listing");
            }

            SyncProgress::Persisted {
                collection,
                key,
                outcome,
            } => {
                tracing::debug!(collection = %collection, key = %key, outcome = ?outcome, "Saved document");
            }

            SyncProgress::ItemFailed {
                collection,
                key,
                reason,
                error,
            } => {
                tracing::warn!(collection = %collection, key = ?key, reason, error = %error, "Skipped item");
            }

            SyncProgress::RetryBackoff {
                label,
                retry_after_ms,
                attempt,
                error,
            } => {
                tracing::warn!(label = %label, retry_after_ms, attempt, error = %error, "Retrying");
            }

            SyncProgress::JobSucceeded { kind, counts } => {
                tracing::info!(
                    job = %kind,
                    fetched = counts.fetched,
                    inserted = counts.inserted,
                    updated = counts.updated,
                    failed = counts.failed,
                    "Job succeeded"
                );
            }

            SyncProgress::JobFailed {
                kind,
                reason,
                error,
            } => {
                tracing::error!(job = %kind, reason, error = %error, "Job failed");
            }

            SyncProgress::PassComplete { succeeded, failed } => {
                tracing::info!(succeeded, failed, "Sync pass complete");
            }

            _ => {}
        }
    }
}
