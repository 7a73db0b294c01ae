use clap::ValueEnum;
use console::style;
use pitchside::sync::{IngestOutcome, JobReport, SyncReport};
use serde::Serialize;
use tabled::Tabled;

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// One table row per job.
#[derive(Tabled, Serialize)]
pub(crate) struct JobRow {
    #[tabled(rename = "Job")]
    job: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Fetched")]
    fetched: usize,
    #[tabled(rename = "Inserted")]
    inserted: usize,
    #[tabled(rename = "Updated")]
    updated: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&JobReport> for JobRow {
    fn from(job: &JobReport) -> Self {
        Self {
            job: job.kind.to_string(),
            state: job.state.to_string(),
            fetched: job.counts.fetched,
            inserted: job.counts.inserted,
            updated: job.counts.updated,
            failed: job.counts.failed,
            reason: job.reason.clone().unwrap_or_default(),
            time: format!("{:.1}s", job.duration.as_secs_f64()),
        }
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{}", table);
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render a sync report.
pub(crate) fn print_report(
    report: &SyncReport,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            print_table(report.jobs.iter().map(JobRow::from).collect());
            for job in &report.jobs {
                if job.reason.is_some() {
                    println!("{} {}: {}", style("✗").red(), job.kind, job.message);
                }
                for error in &job.errors {
                    println!("{} {}: {}", style("!").yellow(), job.kind, error);
                }
            }
            println!(
                "{} succeeded, {} failed in {:.1}s",
                style(report.succeeded()).green(),
                style(report.failed()).red(),
                report.duration.as_secs_f64()
            );
        }
        OutputFormat::Json => print_json(report)?,
    }
    Ok(())
}

#[derive(Tabled)]
struct IngestRow {
    #[tabled(rename = "Collection")]
    collection: String,
    #[tabled(rename = "Fetched")]
    fetched: usize,
    #[tabled(rename = "Inserted")]
    inserted: usize,
    #[tabled(rename = "Updated")]
    updated: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
}

/// Render the outcome of an ingest.
pub(crate) fn print_ingest(
    collection: pitchside::Collection,
    outcome: &IngestOutcome,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            let c = outcome.counts;
            print_table(vec![IngestRow {
                collection: collection.to_string(),
                fetched: c.fetched,
                inserted: c.inserted,
                updated: c.updated,
                failed: c.failed,
            }]);
            for error in &outcome.errors {
                println!("{} {}", style("!").yellow(), error);
            }
        }
        OutputFormat::Json => print_json(outcome)?,
    }
    Ok(())
}
