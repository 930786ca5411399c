//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use storyflow_catalog::application::yaml_source::YamlCatalogSource;
use storyflow_core::clock::Clock;
use storyflow_ledger::application::ledger::RewardLedger;
use storyflow_ledger::application::notifier::StatsNotifier;
use storyflow_narrative::application::engine::{EngineConfig, FlowEngine};
use storyflow_store::memory_player_store::InMemoryPlayerStateStore;
use storyflow_test_support::FixedClock;
use tower::ServiceExt;

use storyflow_api::state::AppState;

const DEMO_CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/catalog.yaml");

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over the demo catalog with in-memory player
/// profiles. Uses the same wiring as `main.rs`.
pub fn build_test_app() -> Router {
    let clock = fixed_clock();
    let source = Arc::new(YamlCatalogSource::from_path(DEMO_CATALOG).unwrap());
    let store = Arc::new(InMemoryPlayerStateStore::new());
    let ledger = RewardLedger::new(store.clone(), clock.clone(), StatsNotifier::default());
    let engine = FlowEngine::new(source, ledger, clock, EngineConfig::default());
    storyflow_api::app(AppState::new(engine, store))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Opens a session for a new player and returns `(session_id, player_id)`.
pub async fn open_session(app: Router) -> (String, String) {
    let player_id = uuid::Uuid::new_v4().to_string();
    let (status, json) = post_json(
        app,
        "/api/v1/sessions",
        &serde_json::json!({ "player_id": player_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (json["session_id"].as_str().unwrap().to_owned(), player_id)
}
