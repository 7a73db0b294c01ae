use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use pitchside::sync::{SyncOptions, ingest};
use pitchside::{Collection, db};
use serde_json::Value;

use crate::commands::output::{OutputFormat, print_ingest};
use crate::progress::ProgressReporter;

/// Read a payload from `path` ("-" for stdin).
fn read_payload(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?
    };
    Ok(serde_json::from_str(&text)?)
}

/// Normalize and store a saved provider payload.
pub(crate) async fn handle_ingest(
    collection: Collection,
    path: &Path,
    options: &SyncOptions,
    output: OutputFormat,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = read_payload(path)?;
    let db = db::connect_and_migrate(database_url).await?;

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let outcome = ingest(&db, collection, &payload, options, Some(&callback)).await;
    reporter.finish();
    let outcome = outcome?;

    print_ingest(collection, &outcome, output)?;

    if outcome.counts.failed > 0 {
        return Err(format!("{} items failed", outcome.counts.failed).into());
    }
    Ok(())
}
