//! Integration tests for sync passes.
//!
//! These tests run full passes against a scripted transport and an in-memory
//! SQLite store, and ensure every pass completes within a bounded time even
//! when the provider misbehaves.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pitchside::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use pitchside::normalize::{Match, Series};
use pitchside::provider::{EndpointUrls, ProviderClient, ProviderConfig};
use pitchside::store;
use pitchside::sync::{JobState, Orchestrator, SyncKind, SyncOptions, SyncProgress};
use pitchside::{Collection, connect_and_migrate};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

/// Maximum time any pass should take in tests.
/// If exceeded, there's likely a hang.
const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

const BASE: &str = "https://cricket.example";

/// Serves the same canned response for a path on every request.
#[derive(Default)]
struct ScriptedTransport {
    routes: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn with_json(self, path: &str, status: u16, body: &Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{BASE}{path}"), (status, serde_json::to_vec(body).unwrap()));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = request.url.split('?').next().unwrap_or_default().to_string();
        let routes = self.routes.lock().unwrap();
        match routes.get(&key) {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: body.clone(),
            }),
            None => Err(HttpError::Transport(format!("connection refused: {key}"))),
        }
    }
}

fn endpoints() -> EndpointUrls {
    EndpointUrls {
        teams: Some(format!("{BASE}/teams/v1/international")),
        news: Some(format!("{BASE}/news/v1/index")),
        matches_recent: Some(format!("{BASE}/matches/v1/recent")),
        matches_upcoming: Some(format!("{BASE}/matches/v1/upcoming")),
        series: Some(format!("{BASE}/series/v1/international")),
        player: None,
        photo: None,
    }
}

async fn setup_test_db() -> Arc<DatabaseConnection> {
    Arc::new(
        connect_and_migrate("sqlite::memory:")
            .await
            .expect("Failed to create test database"),
    )
}

fn orchestrator(transport: Arc<ScriptedTransport>, db: Arc<DatabaseConnection>) -> Orchestrator {
    let config = ProviderConfig::new("integration-key", "cricket.example", endpoints())
        .with_requests_per_second(0);
    let client = ProviderClient::new_with_transport(config, transport).unwrap();
    Orchestrator::new(client, db)
}

fn recent_matches() -> Value {
    json!({"typeMatches": [
        {"matchType": "International", "seriesMatches": [
            {"seriesAdWrapper": {"seriesId": 7476, "seriesName": "England tour of India, 2024", "matches": [
                {"matchInfo": {
                    "matchId": 89654, "matchFormat": "TEST", "state": "Complete",
                    "status": "India won by 106 runs",
                    "team1": {"teamId": 2, "teamName": "India", "teamSName": "IND"},
                    "team2": {"teamId": 9, "teamName": "England", "teamSName": "ENG"}
                }},
                {"matchInfo": {
                    "matchId": 89660, "matchFormat": "TEST", "state": "In Progress",
                    "status": "Day 1: 2nd Session",
                    "team1": {"teamId": 2, "teamName": "India", "teamSName": "IND"},
                    "team2": {"teamId": 9, "teamName": "England", "teamSName": "ENG"}
                },
                "matchScore": {"team1Score": {
                    "inngs1": {"inningsId": 1, "runs": 120, "wickets": 2, "overs": 30.3}
                }}}
            ]}},
            {"adDetail": {"name": "native_ad"}}
        ]},
        {"matchType": "League", "seriesMatches": [
            {"seriesAdWrapper": {"seriesId": 7572, "seriesName": "IPL 2024", "matches": [
                {"matchInfo": {"matchId": 91000, "state": "Abandoned", "status": "Match abandoned due to rain"}}
            ]}}
        ]}
    ]})
}

fn full_transport() -> ScriptedTransport {
    ScriptedTransport::default()
        .with_json(
            "/teams/v1/international",
            200,
            &json!({"list": [
                {"teamName": "Test Teams"},
                {"teamId": 2, "teamName": "India", "teamSName": "IND"},
                {"teamId": 9, "teamName": "England", "teamSName": "ENG"}
            ]}),
        )
        .with_json(
            "/news/v1/index",
            200,
            &json!({"storyList": [{"story": {"id": 1, "hline": "Jaiswal hits double ton"}}]}),
        )
        .with_json("/matches/v1/recent", 200, &recent_matches())
        .with_json(
            "/matches/v1/upcoming",
            200,
            &json!({"typeMatches": []}),
        )
        .with_json(
            "/series/v1/international",
            200,
            &json!({"seriesMapProto": [
                {"date": "FEBRUARY 2024", "series": [{"id": 7476, "name": "England tour of India, 2024"}]}
            ]}),
        )
}

// ─── Full Pass Tests ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_pass_persists_every_collection() {
    let transport = Arc::new(full_transport());
    let db = setup_test_db().await;
    let orchestrator = orchestrator(Arc::clone(&transport), Arc::clone(&db));

    let report = tokio::time::timeout(SYNC_TIMEOUT, orchestrator.run_all(None))
        .await
        .expect("pass should not hang");

    assert!(!report.has_failures(), "unexpected failures: {report:?}");
    assert_eq!(transport.calls(), SyncKind::ALL.len());

    assert_eq!(store::count(&db, Collection::Teams).await.unwrap(), 2);
    assert_eq!(store::count(&db, Collection::News).await.unwrap(), 1);
    assert_eq!(store::count(&db, Collection::Matches).await.unwrap(), 3);
    assert_eq!(store::count(&db, Collection::Series).await.unwrap(), 1);

    let upcoming = report.job(SyncKind::MatchesUpcoming).unwrap();
    assert_eq!(upcoming.state, JobState::Succeeded);
    assert_eq!(upcoming.counts.fetched, 0);

    let series: Series = store::find_decoded(&db, Collection::Series, "7476")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(series.month, "FEBRUARY 2024");
}

#[tokio::test]
async fn test_no_terminal_match_is_live() {
    let transport = Arc::new(full_transport());
    let db = setup_test_db().await;
    orchestrator(transport, Arc::clone(&db))
        .sync_matches_recent(None)
        .await;

    for key in ["89654", "89660", "91000"] {
        let m: Match = store::find_decoded(&db, Collection::Matches, key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.is_live, key == "89660", "match {key}");
    }

    let live: Match = store::find_decoded(&db, Collection::Matches, "89660")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.teams[0].score.runs, 120);
    assert_eq!(live.teams[1].score.runs, 0);
    assert_eq!(live.match_type, "International");
}

#[tokio::test]
async fn test_second_pass_updates_instead_of_duplicating() {
    let transport = Arc::new(full_transport());
    let db = setup_test_db().await;
    let orchestrator = orchestrator(transport, Arc::clone(&db));

    orchestrator.run_all(None).await;
    let second = orchestrator.run_all(None).await;

    let teams = second.job(SyncKind::Teams).unwrap();
    assert_eq!(teams.counts.inserted, 0);
    assert_eq!(teams.counts.updated, 2);
    assert_eq!(store::count(&db, Collection::Teams).await.unwrap(), 2);
}

// ─── Failure Isolation Tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_news_rate_limit_isolated_from_other_jobs() {
    let transport = Arc::new(full_transport().with_json("/news/v1/index", 429, &json!({})));
    let db = setup_test_db().await;

    let report = orchestrator(transport, db).run_all(None).await;

    let failed: Vec<_> = report
        .jobs
        .iter()
        .filter(|j| j.state == JobState::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].kind, SyncKind::News);
    assert_eq!(failed[0].reason.as_deref(), Some("RateLimited"));
    assert_eq!(report.succeeded(), 4);
}

#[tokio::test]
async fn test_unreachable_provider_fails_every_job_but_completes() {
    let transport = Arc::new(ScriptedTransport::default());
    let db = setup_test_db().await;

    let report = tokio::time::timeout(SYNC_TIMEOUT, orchestrator(transport, db).run_all(None))
        .await
        .expect("pass should not hang");

    assert_eq!(report.jobs.len(), SyncKind::ALL.len());
    assert!(
        report
            .jobs
            .iter()
            .all(|j| j.reason.as_deref() == Some("TransportError"))
    );
}

#[tokio::test]
async fn test_concurrent_passes_leave_one_document_per_key() {
    let transport = Arc::new(full_transport());
    let db = setup_test_db().await;
    let a = orchestrator(Arc::clone(&transport), Arc::clone(&db))
        .with_options(SyncOptions::default());
    let b = a.clone();

    let (ra, rb) = tokio::time::timeout(SYNC_TIMEOUT, async {
        tokio::join!(a.sync_teams(None), b.sync_teams(None))
    })
    .await
    .expect("concurrent passes should not hang");

    assert_eq!(ra.state, JobState::Succeeded);
    assert_eq!(rb.state, JobState::Succeeded);
    assert_eq!(store::count(&db, Collection::Teams).await.unwrap(), 2);
}

#[tokio::test]
async fn test_progress_callback_sees_failed_job() {
    let transport = Arc::new(full_transport().with_json("/series/v1/international", 500, &json!({"error": "boom"})));
    let db = setup_test_db().await;

    let failures = Arc::new(AtomicUsize::new(0));
    let capture = Arc::clone(&failures);
    let callback: pitchside::sync::ProgressCallback = Box::new(move |event| {
        if let SyncProgress::JobFailed { reason, .. } = event {
            assert_eq!(reason, "ProviderError");
            capture.fetch_add(1, Ordering::SeqCst);
        }
    });

    let report = orchestrator(transport, db).run_all(Some(&callback)).await;
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(report.failed(), 1);
}
