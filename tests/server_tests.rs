// HTTP pass-through endpoint tests, served in-process with tower's oneshot

mod test_helpers;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use brewlens::api::RawPackage;
use brewlens::{CatalogCache, PackageKind};
use brewlens::server::{AppState, router};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{FakeSource, ManualClock, cask, formula};
use tower::ServiceExt;

fn state() -> AppState<FakeSource, ManualClock> {
    let source = FakeSource::new(
        vec![
            formula("redis", "Persistent key-value database").into(),
            formula("hiredis", "Minimalistic client for Redis").into(),
            formula("wget", "Internet file retriever").into(),
        ],
        vec![cask("firefox", "Mozilla Firefox", "Web browser").into()],
    );
    let cache = CatalogCache::with_clock(source, ManualClock::new(), Duration::from_secs(60));
    AppState::new(Arc::new(cache), "https://formulae.brew.sh/api")
}

async fn get(state: AppState<FakeSource, ManualClock>, uri: &str) -> (StatusCode, Value) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_list_defaults_to_formulae() {
    let (status, body) = get(state(), "/api/packages").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["redis", "hiredis", "wget"]);
}

#[tokio::test]
async fn test_list_filters_like_the_query_engine() {
    let (status, body) = get(state(), "/api/packages?type=formula&q=REDIS").await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["desc"], "Persistent key-value database");
}

#[tokio::test]
async fn test_list_returns_raw_cask_objects() {
    let (status, body) = get(state(), "/api/packages?type=cask&q=mozilla").await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["token"], "firefox");
    assert_eq!(items[0]["name"][0], "Mozilla Firefox");
}

#[tokio::test]
async fn test_list_passes_upstream_objects_through() {
    let upstream = serde_json::json!({
        "name": "jq",
        "desc": null,
        "dependencies": null,
        "versions": {"stable": "1.7.1", "bottle": null},
    });
    let state = state();
    state.cache.source().set_formulae(vec![
        RawPackage::from_value(PackageKind::Formula, upstream.clone()).unwrap(),
    ]);

    let (status, body) = get(state, "/api/packages?q=jq").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([upstream]));
}

#[tokio::test]
async fn test_list_rejects_unknown_type() {
    let (status, body) = get(state(), "/api/packages?type=bottle").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("bottle"));
}

#[tokio::test]
async fn test_list_upstream_failure_is_500() {
    let state = state();
    state.cache.source().set_failing(true);
    let (status, body) = get(state, "/api/packages?type=formula").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch packages");
}

#[tokio::test]
async fn test_detail_returns_record_and_view() {
    let (status, body) = get(state(), "/api/packages/cask/firefox").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["id"], "firefox");
    assert_eq!(body["record"]["displayName"], "Mozilla Firefox");
    assert_eq!(
        body["detail"]["installCommand"],
        "brew install --cask firefox"
    );
    assert_eq!(
        body["detail"]["jsonUrl"],
        "https://formulae.brew.sh/api/cask/firefox.json"
    );
}

#[tokio::test]
async fn test_detail_unknown_token_is_404() {
    let (status, body) = get(state(), "/api/packages/formula/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(state(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "brewlens");
}
