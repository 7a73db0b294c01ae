//! Normalize and persist the items of one payload.

use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::Value;

use crate::entity::collection::Collection;
use crate::normalize::{self, ListingItem, listing};
use crate::store::{self, PersistResult};
use crate::sync::error::{Result, SyncError};
use crate::sync::progress::{ProgressCallback, SyncProgress, emit};
use crate::sync::types::{JobCounts, SyncOptions};

/// Counts and item-level errors from persisting a batch of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    pub counts: JobCounts,
    pub errors: Vec<String>,
}

/// Normalize and upsert a raw payload that is either a listing or a single
/// entity of `collection`.
///
/// # Errors
/// `SyncError::Normalization` if a listing is structurally unusable. Errors on
/// individual items are counted in the outcome instead.
pub async fn ingest(
    db: &DatabaseConnection,
    collection: Collection,
    payload: &Value,
    options: &SyncOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<IngestOutcome> {
    let items = listing::split_any(collection, payload)?;
    Ok(persist_items(db, collection, &items, options, on_progress).await)
}

/// Persist each item, isolating failures to the item.
pub(crate) async fn persist_items(
    db: &DatabaseConnection,
    collection: Collection,
    items: &[ListingItem<'_>],
    options: &SyncOptions,
    on_progress: Option<&ProgressCallback>,
) -> IngestOutcome {
    let mut outcome = IngestOutcome {
        counts: JobCounts {
            fetched: items.len(),
            ..JobCounts::default()
        },
        errors: Vec::new(),
    };

    for item in items {
        let record = match normalize::normalize_item(collection, item) {
            Ok(record) => record,
            Err(e) => {
                outcome.record_failure(collection, None, SyncError::from(e), on_progress);
                continue;
            }
        };

        let key = record.natural_key().to_string();
        match store::upsert_with_retry(
            db,
            &record,
            options.upsert_retries,
            options.upsert_backoff_ms,
        )
        .await
        {
            Ok(result) => {
                match result {
                    PersistResult::Inserted => outcome.counts.inserted += 1,
                    PersistResult::Updated => outcome.counts.updated += 1,
                }
                emit(
                    on_progress,
                    SyncProgress::Persisted {
                        collection,
                        key,
                        outcome: result,
                    },
                );
            }
            Err(e) => outcome.record_failure(collection, Some(key), SyncError::from(e), on_progress),
        }
    }

    outcome
}

impl IngestOutcome {
    fn record_failure(
        &mut self,
        collection: Collection,
        key: Option<String>,
        error: SyncError,
        on_progress: Option<&ProgressCallback>,
    ) {
        self.counts.failed += 1;
        let label = key.as_deref().unwrap_or("?");
        tracing::warn!(
            collection = %collection,
            key = %label,
            reason = error.reason(),
            error = %error,
            "Skipping item"
        );
        self.errors
            .push(format!("{}/{}: {}", collection, label, error.short_message()));
        emit(
            on_progress,
            SyncProgress::ItemFailed {
                collection,
                key,
                reason: error.reason(),
                error: error.to_string(),
            },
        );
    }
}
