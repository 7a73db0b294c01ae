//! Integration tests for the document store.
//!
//! These tests require the `sqlite` and `migrate` features to be enabled
//! and use an in-memory SQLite database.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use chrono::{Duration, Utc};
use pitchside::normalize::{self, Match, Photo, listing};
use pitchside::store::{self, PersistResult};
use pitchside::{Collection, IndexField, connect_and_migrate};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

/// Create an in-memory SQLite database with migrations applied.
async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

async fn upsert_payload(db: &DatabaseConnection, kind: Collection, payload: &Value) -> PersistResult {
    let record = normalize::normalize(kind, payload).expect("payload should normalize");
    store::upsert(db, &record).await.expect("upsert should succeed")
}

fn live_match() -> Value {
    json!({
        "matchInfo": {
            "matchId": 89654,
            "seriesId": 7476,
            "seriesName": "England tour of India, 2024",
            "matchDesc": "2nd Test",
            "matchFormat": "TEST",
            "state": "In Progress",
            "status": "Day 2: Stumps - India lead by 171 runs",
            "team1": {"teamId": 2, "teamName": "India", "teamSName": "IND"},
            "team2": {"teamId": 9, "teamName": "England", "teamSName": "ENG"},
            "venueInfo": {"ground": "Dr. Y.S. Rajasekhara Reddy ACA-VDCA Cricket Stadium", "city": "Visakhapatnam"}
        },
        "matchScore": {
            "team1Score": {"inngs1": {"inningsId": 1, "runs": 396, "wickets": 10, "overs": 112}},
            "team2Score": {"inngs1": {"inningsId": 2, "runs": 253, "wickets": 10, "overs": 55.5}}
        }
    })
}

// ─── Upsert Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_match_lifecycle_live_then_complete() {
    let db = setup_test_db().await;

    assert_eq!(
        upsert_payload(&db, Collection::Matches, &live_match()).await,
        PersistResult::Inserted
    );
    let live: Match = store::find_decoded(&db, Collection::Matches, "89654")
        .await
        .unwrap()
        .unwrap();
    assert!(live.is_live);
    assert_eq!(live.teams.len(), 2);

    // The completion payload only carries the status.
    let finished = json!({
        "matchInfo": {
            "matchId": 89654,
            "state": "Complete",
            "status": "India won by 106 runs"
        }
    });
    assert_eq!(
        upsert_payload(&db, Collection::Matches, &finished).await,
        PersistResult::Updated
    );

    let done: Match = store::find_decoded(&db, Collection::Matches, "89654")
        .await
        .unwrap()
        .unwrap();
    assert!(!done.is_live);
    assert_eq!(done.status, "India won by 106 runs");
    // Silent fields survive from the first sync.
    assert_eq!(done.series_name, "England tour of India, 2024");
    assert_eq!(done.teams.len(), 2);

    let doc = store::find(&db, Collection::Matches, "89654").await.unwrap().unwrap();
    assert_eq!(doc.raw, finished);
}

#[tokio::test]
async fn test_normalizing_twice_stores_one_equal_document() {
    let db = setup_test_db().await;
    let payload = live_match();

    let first = normalize::normalize(Collection::Matches, &payload).unwrap();
    let second = normalize::normalize(Collection::Matches, &payload).unwrap();
    assert_eq!(first, second);

    store::upsert(&db, &first).await.unwrap();
    let body_before = store::find(&db, Collection::Matches, "89654")
        .await
        .unwrap()
        .unwrap()
        .body;
    store::upsert(&db, &second).await.unwrap();
    let body_after = store::find(&db, Collection::Matches, "89654")
        .await
        .unwrap()
        .unwrap()
        .body;

    assert_eq!(body_before, body_after);
    assert_eq!(store::count(&db, Collection::Matches).await.unwrap(), 1);
}

#[tokio::test]
async fn test_document_json_carries_tracking_fields() {
    let db = setup_test_db().await;
    upsert_payload(&db, Collection::Teams, &json!({"teamId": 2, "teamName": "India"})).await;

    let doc = store::find(&db, Collection::Teams, "2").await.unwrap().unwrap();
    let json = doc.to_json();
    assert_eq!(json["teamId"], json!("2"));
    assert_eq!(json["raw"]["teamName"], json!("India"));
    assert!(json["lastSynced"].is_string());
    assert!(json["lastAccessed"].is_null());
}

// ─── Index Tests ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_series_listing_indexes_matches_and_month() {
    let db = setup_test_db().await;
    let payload = json!({"seriesMapProto": [
        {"date": "FEBRUARY 2024", "series": [
            {"id": 7476, "name": "England tour of India, 2024", "matchIds": [89654, 89655]}
        ]},
        {"date": "MARCH 2024", "series": [{"id": 7572, "name": "IPL 2024"}]}
    ]});

    for item in listing::split_listing(Collection::Series, &payload).unwrap() {
        let record = normalize::normalize_item(Collection::Series, &item).unwrap();
        store::upsert(&db, &record).await.unwrap();
    }

    let february = store::find_by_index(&db, Collection::Series, IndexField::Month, "FEBRUARY 2024", 10)
        .await
        .unwrap();
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].natural_key, "7476");

    let containing = store::find_related(&db, Collection::Series, IndexField::Match, "89655", 10)
        .await
        .unwrap();
    assert_eq!(containing.len(), 1);
}

#[tokio::test]
async fn test_match_is_related_to_its_teams_and_series() {
    let db = setup_test_db().await;
    upsert_payload(&db, Collection::Matches, &live_match()).await;

    let by_team = store::find_related(&db, Collection::Matches, IndexField::Team, "9", 10)
        .await
        .unwrap();
    assert_eq!(by_team.len(), 1);

    let by_series = store::find_related(&db, Collection::Matches, IndexField::Series, "7476", 10)
        .await
        .unwrap();
    assert_eq!(by_series.len(), 1);

    assert!(
        store::find_related(&db, Collection::Matches, IndexField::Team, "3", 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_photo_reads_track_access_but_syncs_do_not() {
    let db = setup_test_db().await;
    let payload = json!({
        "photoId": 338542,
        "caption": "Yashasvi Jaiswal celebrates his double hundred",
        "tags": ["Yashasvi Jaiswal", "India"],
        "relatedMatches": [89654],
        "width": 1200,
        "height": 800
    });
    upsert_payload(&db, Collection::Photos, &payload).await;

    let photo = store::find_photo(&db, "338542").await.unwrap().unwrap();
    let first_access = photo.last_accessed.expect("read should record access");
    let decoded: Photo = photo.decode().unwrap();
    assert_eq!(decoded.width, Some(1200));

    // Re-syncing keeps the access time; the staleness scan does not read content.
    upsert_payload(&db, Collection::Photos, &payload).await;
    let scanned = store::find_stale(&db, Collection::Photos, Utc::now() + Duration::hours(1), 10)
        .await
        .unwrap();
    assert_eq!(scanned[0].last_accessed, Some(first_access));

    let reread = store::find(&db, Collection::Photos, "338542").await.unwrap().unwrap();
    assert!(reread.last_accessed.unwrap() >= first_access);

    assert!(store::find_photo(&db, "1").await.unwrap().is_none());
}

// ─── Recency Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_stale_respects_collection_and_limit() {
    let db = setup_test_db().await;
    for id in 1..=5 {
        upsert_payload(&db, Collection::News, &json!({"id": id, "hline": format!("Story {id}")})).await;
    }
    upsert_payload(&db, Collection::Teams, &json!({"teamId": 2})).await;

    let cutoff = Utc::now() + Duration::minutes(5);
    let stale = store::find_stale(&db, Collection::News, cutoff, 3).await.unwrap();
    assert_eq!(stale.len(), 3);
    assert!(stale.iter().all(|d| d.collection == Collection::News));

    let recent = store::find_recent(&db, Collection::Teams, 10).await.unwrap();
    assert_eq!(recent.len(), 1);
}
