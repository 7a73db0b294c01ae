use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use serde::de::DeserializeOwned;

use crate::entity::collection::Collection;
use crate::entity::document::{Column, Entity as Document, Model};
use crate::entity::document_index::{Column as IndexColumn, Entity as DocumentIndex, IndexField};

use super::errors::{Result, StoreError};

// ─── Lookups ─────────────────────────────────────────────────────────────────

/// Find a document by natural key.
///
/// Photo reads record the access in `last_accessed`.
pub async fn find(
    db: &DatabaseConnection,
    collection: Collection,
    key: &str,
) -> Result<Option<Model>> {
    let found = Document::find()
        .filter(Column::Collection.eq(collection))
        .filter(Column::NaturalKey.eq(key))
        .one(db)
        .await?;

    match found {
        Some(doc) => {
            let mut docs = [doc];
            touch_photos(db, &mut docs).await?;
            let [doc] = docs;
            Ok(Some(doc))
        }
        None => Ok(None),
    }
}

/// Find a document and decode its canonical fields.
pub async fn find_decoded<T: DeserializeOwned>(
    db: &DatabaseConnection,
    collection: Collection,
    key: &str,
) -> Result<Option<T>> {
    match find(db, collection, key).await? {
        Some(doc) => Ok(Some(doc.decode()?)),
        None => Ok(None),
    }
}

/// Read a photo, recording the access in `last_accessed`.
pub async fn find_photo(db: &DatabaseConnection, key: &str) -> Result<Option<Model>> {
    find(db, Collection::Photos, key).await
}

/// Set `last_accessed` to now on every photo among `docs`, in the store and
/// on the returned models. Other collections are not access-tracked.
async fn touch_photos(db: &DatabaseConnection, docs: &mut [Model]) -> Result<()> {
    let ids: Vec<_> = docs
        .iter()
        .filter(|doc| doc.collection == Collection::Photos)
        .map(|doc| doc.id)
        .collect();
    if ids.is_empty() {
        return Ok(());
    }

    let now = Utc::now().fixed_offset();
    Document::update_many()
        .col_expr(Column::LastAccessed, Expr::value(now))
        .filter(Column::Id.is_in(ids))
        .exec(db)
        .await?;

    for doc in docs
        .iter_mut()
        .filter(|doc| doc.collection == Collection::Photos)
    {
        doc.last_accessed = Some(now);
    }
    Ok(())
}

// ─── Index Queries ───────────────────────────────────────────────────────────

/// Documents whose index has `field = value`, most recently synced first.
pub async fn find_by_index(
    db: &DatabaseConnection,
    collection: Collection,
    field: IndexField,
    value: &str,
    limit: u64,
) -> Result<Vec<Model>> {
    let keys: Vec<String> = DocumentIndex::find()
        .select_only()
        .column(IndexColumn::NaturalKey)
        .filter(IndexColumn::Collection.eq(collection))
        .filter(IndexColumn::Field.eq(field))
        .filter(IndexColumn::Value.eq(value))
        .into_tuple()
        .all(db)
        .await?;

    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut docs = Document::find()
        .filter(Column::Collection.eq(collection))
        .filter(Column::NaturalKey.is_in(keys))
        .order_by_desc(Column::LastSynced)
        .limit(limit)
        .all(db)
        .await?;
    touch_photos(db, &mut docs).await?;
    Ok(docs)
}

/// Photos carrying a tag.
pub async fn find_by_tag(db: &DatabaseConnection, tag: &str, limit: u64) -> Result<Vec<Model>> {
    find_by_index(db, Collection::Photos, IndexField::Tag, tag, limit).await
}

/// Documents in `collection` that reference `key` through `relation`.
///
/// For example, the photos of a match are
/// `find_related(db, Collection::Photos, IndexField::Match, "89654", 20)` and
/// the matches of a series are
/// `find_related(db, Collection::Matches, IndexField::Series, "7476", 100)`.
pub async fn find_related(
    db: &DatabaseConnection,
    collection: Collection,
    relation: IndexField,
    key: &str,
    limit: u64,
) -> Result<Vec<Model>> {
    find_by_index(db, collection, relation, key, limit).await
}

// ─── Recency ─────────────────────────────────────────────────────────────────

/// Most recently synced documents of a collection.
pub async fn find_recent(
    db: &DatabaseConnection,
    collection: Collection,
    limit: u64,
) -> Result<Vec<Model>> {
    let mut docs = Document::find()
        .filter(Column::Collection.eq(collection))
        .order_by_desc(Column::LastSynced)
        .limit(limit)
        .all(db)
        .await?;
    touch_photos(db, &mut docs).await?;
    Ok(docs)
}

/// Documents not synced since `older_than`, oldest first.
///
/// This is a re-sync scan over sync times, not a content read, so photos keep
/// their `last_accessed`.
pub async fn find_stale(
    db: &DatabaseConnection,
    collection: Collection,
    older_than: DateTime<Utc>,
    limit: u64,
) -> Result<Vec<Model>> {
    Document::find()
        .filter(Column::Collection.eq(collection))
        .filter(Column::LastSynced.lt(older_than.fixed_offset()))
        .order_by_asc(Column::LastSynced)
        .limit(limit)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Count documents in a collection.
pub async fn count(db: &DatabaseConnection, collection: Collection) -> Result<u64> {
    Document::find()
        .filter(Column::Collection.eq(collection))
        .count(db)
        .await
        .map_err(StoreError::from)
}
