use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait, sea_query::OnConflict,
};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::entity::collection::Collection;
use crate::entity::document::{ActiveModel, Column, Entity as Document};
use crate::entity::document_index::{
    ActiveModel as IndexActiveModel, Column as IndexColumn, Entity as DocumentIndex, IndexField,
};
use crate::normalize::CanonicalRecord;

use super::errors::{Result, StoreError};

/// Outcome of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistResult {
    Inserted,
    Updated,
}

/// Default number of retry attempts for transient database errors.
pub const DEFAULT_UPSERT_RETRIES: u32 = 3;

/// Default initial backoff delay in milliseconds for upsert retries.
pub const DEFAULT_UPSERT_BACKOFF_MS: u64 = 100;

/// Insert or update a canonical record by `(collection, natural key)`.
///
/// Fields present in the record replace stored ones; fields the record omits
/// keep their stored values. Derived fields such as a match's `isLive` are
/// recomputed from the merged document. `raw` is replaced with the record's payload and
/// `last_synced` is set to now. `last_accessed` is never touched.
///
/// The lookup, write and index refresh share one transaction, and the write is
/// an `INSERT ... ON CONFLICT DO UPDATE`, so a concurrent upsert of the same
/// key resolves to the last writer instead of a duplicate or an error.
pub async fn upsert(db: &DatabaseConnection, record: &CanonicalRecord) -> Result<PersistResult> {
    let collection = record.kind();
    let key = record.natural_key();
    let incoming = record.to_document()?;

    let txn = db.begin().await?;

    let existing = Document::find()
        .filter(Column::Collection.eq(collection))
        .filter(Column::NaturalKey.eq(key))
        .one(&txn)
        .await?;

    let (id, mut body, outcome) = match existing {
        Some(doc) => (doc.id, merge_documents(doc.body, incoming), PersistResult::Updated),
        None => (Uuid::new_v4(), Value::Object(incoming), PersistResult::Inserted),
    };
    if let Value::Object(fields) = &mut body {
        record.reconcile(fields);
    }

    let model = ActiveModel {
        id: Set(id),
        collection: Set(collection),
        natural_key: Set(key.to_string()),
        body: Set(body),
        raw: Set(record.raw.clone()),
        last_synced: Set(Utc::now().fixed_offset()),
        last_accessed: NotSet,
    };

    Document::insert(model)
        .on_conflict(build_upsert_on_conflict())
        .exec_without_returning(&txn)
        .await?;

    refresh_index(&txn, collection, key, record.index_entries()).await?;

    txn.commit().await?;

    tracing::debug!(collection = %collection, key = %key, outcome = ?outcome, "Upserted document");
    Ok(outcome)
}

/// Upsert with retry of transient database errors.
///
/// # Arguments
/// * `max_retries` - Maximum number of retry attempts (0 = no retries)
/// * `initial_backoff_ms` - Initial backoff delay in milliseconds (doubles each retry)
pub async fn upsert_with_retry(
    db: &DatabaseConnection,
    record: &CanonicalRecord,
    max_retries: u32,
    initial_backoff_ms: u64,
) -> Result<PersistResult> {
    let mut backoff_ms = initial_backoff_ms;
    let mut attempt = 0;

    loop {
        match upsert(db, record).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                tracing::warn!(
                    collection = %record.kind(),
                    key = %record.natural_key(),
                    attempt = attempt,
                    max_retries = max_retries,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Upsert failed, retrying..."
                );
                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                backoff_ms = backoff_ms.saturating_mul(2);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Top-level merge: incoming fields replace stored ones, the rest survive.
pub fn merge_documents(existing: Value, incoming: Map<String, Value>) -> Value {
    let mut merged = match existing {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.extend(incoming);
    Value::Object(merged)
}

/// Build the ON CONFLICT clause used by upsert.
///
/// Conflict detection uses `(collection, natural_key)`. `id` and
/// `last_accessed` keep their stored values.
pub(crate) fn build_upsert_on_conflict() -> OnConflict {
    OnConflict::columns([Column::Collection, Column::NaturalKey])
        .update_columns([Column::Body, Column::Raw, Column::LastSynced])
        .to_owned()
}

/// Replace a document's secondary index rows.
async fn refresh_index(
    txn: &DatabaseTransaction,
    collection: Collection,
    key: &str,
    entries: Vec<(IndexField, String)>,
) -> Result<()> {
    DocumentIndex::delete_many()
        .filter(IndexColumn::Collection.eq(collection))
        .filter(IndexColumn::NaturalKey.eq(key))
        .exec(txn)
        .await?;

    if entries.is_empty() {
        return Ok(());
    }

    let rows = entries.into_iter().map(|(field, value)| IndexActiveModel {
        id: Set(Uuid::new_v4()),
        collection: Set(collection),
        natural_key: Set(key.to_string()),
        field: Set(field),
        value: Set(value),
    });
    DocumentIndex::insert_many(rows)
        .exec_without_returning(txn)
        .await
        .map_err(StoreError::from)?;
    Ok(())
}
