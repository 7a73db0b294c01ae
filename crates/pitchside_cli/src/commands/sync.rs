use std::sync::Arc;

use pitchside::db;
use pitchside::provider::{ProviderClient, ProviderConfig};
use pitchside::sync::{Orchestrator, SyncKind, SyncOptions, SyncReport};

use crate::commands::output::{OutputFormat, print_report};
use crate::progress::ProgressReporter;

/// Run one or more sync jobs and print the report.
///
/// Returns an error if any job or item failed, so the exit code reflects it.
pub(crate) async fn handle_sync(
    kinds: &[SyncKind],
    provider: ProviderConfig,
    options: SyncOptions,
    output: OutputFormat,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ProviderClient::new(provider)?;
    let db = db::connect_and_migrate(database_url).await?;

    let orchestrator = Orchestrator::new(client, Arc::new(db)).with_options(options);

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let report = orchestrator.run_jobs(kinds, Some(&callback)).await;
    reporter.finish();

    print_report(&report, output)?;

    match failure_summary(&report) {
        Some(summary) => Err(summary.into()),
        None => Ok(()),
    }
}

/// Describe the failures in a report, naming failed jobs first and failed
/// items when every job itself succeeded.
fn failure_summary(report: &SyncReport) -> Option<String> {
    if !report.has_failures() {
        return None;
    }
    let failed_jobs = report.failed();
    let failed_items: usize = report.jobs.iter().map(|j| j.counts.failed).sum();
    let summary = match (failed_jobs, failed_items) {
        (0, items) => format!("{} items failed to sync", items),
        (jobs, 0) => format!("{} of {} jobs failed", jobs, report.jobs.len()),
        (jobs, items) => format!(
            "{} of {} jobs failed, {} items failed to sync",
            jobs,
            report.jobs.len(),
            items
        ),
    };
    Some(summary)
}
