//! Document store: upsert-by-key persistence and indexed queries.
//!
//! Each canonical record becomes one row in `documents`, unique on
//! `(collection, natural_key)`, with its secondary index rows kept in
//! `document_index`.

mod errors;
mod query;
mod upsert;

pub use errors::{Result, StoreError};
pub use query::{
    count, find, find_by_index, find_by_tag, find_decoded, find_photo, find_recent, find_related,
    find_stale,
};
pub use upsert::{
    DEFAULT_UPSERT_BACKOFF_MS, DEFAULT_UPSERT_RETRIES, PersistResult, merge_documents, upsert,
    upsert_with_retry,
};

#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use chrono::{Duration, Utc};
    use sea_orm::DatabaseConnection;
    use serde_json::json;

    use super::*;
    use crate::connect_and_migrate;
    use crate::entity::collection::Collection;
    use crate::entity::document_index::IndexField;
    use crate::normalize::{Match, Team, normalize};

    async fn setup_db() -> DatabaseConnection {
        connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate")
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates() {
        let db = setup_db().await;
        let record = normalize(Collection::Teams, &json!({"teamId": 2, "teamName": "India"})).unwrap();

        assert_eq!(upsert(&db, &record).await.unwrap(), PersistResult::Inserted);
        assert_eq!(upsert(&db, &record).await.unwrap(), PersistResult::Updated);
        assert_eq!(count(&db, Collection::Teams).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn second_record_wins_where_explicit_and_first_survives_where_silent() {
        let db = setup_db().await;
        let first = normalize(
            Collection::Teams,
            &json!({"teamId": 2, "teamName": "India", "teamSName": "IND", "imageId": 719024}),
        )
        .unwrap();
        let second = normalize(
            Collection::Teams,
            &json!({"teamId": "2", "teamName": "India Men"}),
        )
        .unwrap();

        upsert(&db, &first).await.unwrap();
        upsert(&db, &second).await.unwrap();

        let team: Team = find_decoded(&db, Collection::Teams, "2").await.unwrap().unwrap();
        assert_eq!(team.team_name, "India Men");
        assert_eq!(team.team_short_name, "IND");
        assert_eq!(team.image_id.as_deref(), Some("719024"));
        assert_eq!(count(&db, Collection::Teams).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stored_raw_equals_latest_payload() {
        let db = setup_db().await;
        let payload = json!({"teamId": 9, "teamName": "England", "odd": [null, {"x": 1.5}]});
        let record = normalize(Collection::Teams, &payload).unwrap();
        upsert(&db, &record).await.unwrap();

        let doc = find(&db, Collection::Teams, "9").await.unwrap().unwrap();
        assert_eq!(doc.raw, payload);
    }

    #[tokio::test]
    async fn same_key_in_different_collections_does_not_collide() {
        let db = setup_db().await;
        upsert(&db, &normalize(Collection::Teams, &json!({"teamId": 1})).unwrap())
            .await
            .unwrap();
        upsert(&db, &normalize(Collection::Series, &json!({"id": 1})).unwrap())
            .await
            .unwrap();

        assert_eq!(count(&db, Collection::Teams).await.unwrap(), 1);
        assert_eq!(count(&db, Collection::Series).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn every_photo_read_touches_last_accessed_but_upsert_does_not() {
        let db = setup_db().await;
        let record = normalize(Collection::Photos, &json!({"photoId": 5, "tags": ["Kohli"]})).unwrap();
        upsert(&db, &record).await.unwrap();

        let stale = find_stale(&db, Collection::Photos, Utc::now() + Duration::hours(1), 10)
            .await
            .unwrap();
        assert!(stale[0].last_accessed.is_none());

        let read = find_photo(&db, "5").await.unwrap().unwrap();
        let first_access = read.last_accessed.expect("find_photo records access");

        let plain = find(&db, Collection::Photos, "5").await.unwrap().unwrap();
        assert!(plain.last_accessed.unwrap() >= first_access);

        // Re-syncing leaves the access time alone.
        upsert(&db, &record).await.unwrap();
        let stale = find_stale(&db, Collection::Photos, Utc::now() + Duration::hours(1), 10)
            .await
            .unwrap();
        assert_eq!(stale[0].last_accessed, plain.last_accessed);
    }

    #[tokio::test]
    async fn find_by_tag_records_access_on_returned_photos() {
        let db = setup_db().await;
        for (id, tag) in [(1, "Kohli"), (2, "Kohli"), (3, "Root")] {
            let record =
                normalize(Collection::Photos, &json!({"photoId": id, "tags": [tag]})).unwrap();
            upsert(&db, &record).await.unwrap();
        }

        let tagged = find_by_tag(&db, "Kohli", 10).await.unwrap();
        assert_eq!(tagged.len(), 2);
        assert!(tagged.iter().all(|doc| doc.last_accessed.is_some()));

        let untouched = find_stale(&db, Collection::Photos, Utc::now() + Duration::hours(1), 10)
            .await
            .unwrap();
        let root = untouched.iter().find(|doc| doc.natural_key == "3").unwrap();
        assert!(root.last_accessed.is_none());
        let kohli = untouched.iter().find(|doc| doc.natural_key == "1").unwrap();
        assert!(kohli.last_accessed.is_some());
    }

    #[tokio::test]
    async fn status_free_update_keeps_terminal_match_non_live() {
        let db = setup_db().await;
        let finished = normalize(
            Collection::Matches,
            &json!({"matchId": 1, "state": "Complete", "status": "India won by 5 wkts"}),
        )
        .unwrap();
        let flagged = normalize(Collection::Matches, &json!({"matchId": 1, "isLive": true})).unwrap();

        upsert(&db, &finished).await.unwrap();
        upsert(&db, &flagged).await.unwrap();

        let m: Match = find_decoded(&db, Collection::Matches, "1").await.unwrap().unwrap();
        assert_eq!(m.state, "Complete");
        assert_eq!(m.status, "India won by 5 wkts");
        assert!(!m.is_live);
        assert_eq!(m.status_note, None);
    }

    #[tokio::test]
    async fn partial_update_keeps_live_match_live() {
        let db = setup_db().await;
        let live = normalize(
            Collection::Matches,
            &json!({"matchId": 2, "state": "In Progress", "status": "India need 20 runs"}),
        )
        .unwrap();
        let retitled = normalize(Collection::Matches, &json!({"matchId": 2, "title": "X"})).unwrap();

        upsert(&db, &live).await.unwrap();
        upsert(&db, &retitled).await.unwrap();

        let m: Match = find_decoded(&db, Collection::Matches, "2").await.unwrap().unwrap();
        assert_eq!(m.title, "X");
        assert_eq!(m.status, "India need 20 runs");
        assert!(m.is_live);
        assert_eq!(m.status_note, None);
    }

    #[tokio::test]
    async fn index_queries_follow_latest_record() {
        let db = setup_db().await;
        upsert(
            &db,
            &normalize(
                Collection::Photos,
                &json!({"photoId": 1, "tags": ["Kohli"], "relatedMatches": [89654]}),
            )
            .unwrap(),
        )
        .await
        .unwrap();
        upsert(
            &db,
            &normalize(Collection::Photos, &json!({"photoId": 2, "tags": ["Root"]})).unwrap(),
        )
        .await
        .unwrap();

        let kohli = find_by_tag(&db, "Kohli", 10).await.unwrap();
        assert_eq!(kohli.len(), 1);
        assert_eq!(kohli[0].natural_key, "1");

        let related = find_related(&db, Collection::Photos, IndexField::Match, "89654", 10)
            .await
            .unwrap();
        assert_eq!(related.len(), 1);

        // Retagging replaces the old index rows.
        upsert(
            &db,
            &normalize(Collection::Photos, &json!({"photoId": 1, "tags": ["Gill"]})).unwrap(),
        )
        .await
        .unwrap();
        assert!(find_by_tag(&db, "Kohli", 10).await.unwrap().is_empty());
        assert_eq!(find_by_tag(&db, "Gill", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recent_and_stale_queries() {
        let db = setup_db().await;
        for id in 1..=3 {
            upsert(
                &db,
                &normalize(Collection::News, &json!({"id": id, "hline": "story"})).unwrap(),
            )
            .await
            .unwrap();
        }

        assert_eq!(find_recent(&db, Collection::News, 2).await.unwrap().len(), 2);

        let future = Utc::now() + Duration::hours(1);
        assert_eq!(
            find_stale(&db, Collection::News, future, 10).await.unwrap().len(),
            3
        );
        let past = Utc::now() - Duration::hours(1);
        assert!(find_stale(&db, Collection::News, past, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_upserts_of_one_key_leave_one_document() {
        let db = setup_db().await;
        let a = normalize(Collection::Teams, &json!({"teamId": 3, "teamName": "A"})).unwrap();
        let b = normalize(Collection::Teams, &json!({"teamId": 3, "teamName": "B"})).unwrap();

        let (ra, rb) = tokio::join!(
            upsert_with_retry(&db, &a, DEFAULT_UPSERT_RETRIES, 1),
            upsert_with_retry(&db, &b, DEFAULT_UPSERT_RETRIES, 1)
        );
        ra.unwrap();
        rb.unwrap();

        assert_eq!(count(&db, Collection::Teams).await.unwrap(), 1);
        let team: Team = find_decoded(&db, Collection::Teams, "3").await.unwrap().unwrap();
        assert!(team.team_name == "A" || team.team_name == "B");
    }
}
