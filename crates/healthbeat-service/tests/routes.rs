//! Route behaviour, driven through the full router with `oneshot`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use healthbeat_core::system::StaticProbe;
use healthbeat_service::{
    app_state::AppState,
    config::ServiceConfig,
    obs::UNMATCHED_ENDPOINT,
    router::{api_routes, build_router, service_router},
};

const MIB: u64 = 1024 * 1024;

fn test_state(frontend_dir: &Path) -> AppState {
    let mut cfg = ServiceConfig::default();
    cfg.service.frontend_dir = frontend_dir.to_path_buf();
    AppState::with_probe(cfg, Arc::new(StaticProbe::new(12.5, 256 * MIB)))
}

async fn get_path(app: &Router, path: &str) -> Response {
    app.clone()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(resp: Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

#[tokio::test]
async fn health_reports_uptime_and_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let resp = get_path(&app, "/api/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["message"], "Backend service is running");
    assert!(v["uptime"].as_f64().unwrap() >= 0.0);
    assert!(v["timestamp"].as_f64().unwrap() > 1_600_000_000.0);
}

#[tokio::test]
async fn uptime_never_goes_backwards() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let mut last = 0.0;
    for i in 0..20 {
        let path = if i % 2 == 0 { "/api/health" } else { "/api/metrics" };
        let v = body_json(get_path(&app, path).await).await;
        let uptime = v["uptime"].as_f64().unwrap();
        assert!(uptime >= last, "{uptime} < {last}");
        last = uptime;
    }
}

#[tokio::test]
async fn api_metrics_counts_every_request_including_itself() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = build_router(state.clone());

    for path in ["/api/health", "/nope", "/api/error", "/metrics", "/", "/api/health"] {
        get_path(&app, path).await;
    }

    let resp = get_path(&app, "/api/metrics").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["requests"], 7);
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["cpu_percent"], 12.5);
    assert_eq!(v["memory_mb"], 256.0);
    assert!(v["uptime"].as_f64().unwrap() >= 0.0);

    assert_eq!(state.request_count(), 7);
    assert_eq!(state.metrics().active_connections.get(&[]), 7.0);
    assert_eq!(state.metrics().cpu_usage.get(&[]), 12.5);
    assert_eq!(state.metrics().memory_usage.get(&[]), (256 * MIB) as f64);
}

#[tokio::test]
async fn active_connections_wraps_at_one_hundred() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = build_router(state.clone());

    for n in 1..=205u64 {
        get_path(&app, "/api/health").await;
        assert_eq!(state.active_connections(), n % 100);
    }

    // 206th request lands on /api/metrics itself.
    get_path(&app, "/api/metrics").await;
    assert_eq!(state.metrics().active_connections.get(&[]), 6.0);
}

#[tokio::test]
async fn simulated_error_is_500_with_fixed_body() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    for _ in 0..3 {
        let resp = get_path(&app, "/api/error").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await, json!({ "error": "Simulated error" }));
    }
}

#[tokio::test]
async fn unknown_path_is_404_json() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = build_router(state.clone());

    let resp = get_path(&app, "/nope").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, json!({ "error": "Not found" }));

    assert_eq!(state.request_count(), 1);
    assert_eq!(
        state
            .metrics()
            .requests
            .get(&[("method", "GET"), ("endpoint", UNMATCHED_ENDPOINT)]),
        1
    );
}

#[tokio::test]
async fn prometheus_endpoint_renders_registry() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    get_path(&app, "/api/health").await;
    let resp = get_path(&app, "/metrics").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
    assert!(ct.starts_with("text/plain; version=0.0.4"), "{ct}");

    let text = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(text.contains("# TYPE app_requests_total counter"));
    assert!(text.contains("app_requests_total{endpoint=\"/api/health\",method=\"GET\"} 1\n"));
    assert!(text.contains("app_requests_total{endpoint=\"/metrics\",method=\"GET\"} 1\n"));
    assert!(text.contains("\napp_cpu_usage_percent 12.5\n"));
    assert!(text.contains(&format!("\napp_memory_usage_bytes {}\n", 256 * MIB)));
    assert!(text.contains("# TYPE app_request_duration_seconds histogram"));
    assert!(text.contains("app_request_duration_seconds_count 1\n"));
}

#[tokio::test]
async fn every_request_is_timed() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = build_router(state.clone());

    for _ in 0..4 {
        get_path(&app, "/api/health").await;
    }
    get_path(&app, "/missing").await;
    assert_eq!(state.metrics().request_duration.count(&[]), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn load_burns_about_one_second() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let t = Instant::now();
    let resp = get_path(&app, "/api/load").await;
    let wall = t.elapsed();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["message"], "Load generated successfully");
    let duration = v["duration"].as_f64().unwrap();
    assert!((1.0..1.5).contains(&duration), "duration={duration}");
    assert!(wall >= Duration::from_secs(1), "wall={wall:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn load_does_not_stall_other_requests() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let busy = {
        let app = app.clone();
        tokio::spawn(async move { get_path(&app, "/api/load").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let t = Instant::now();
    let resp = get_path(&app, "/api/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(t.elapsed() < Duration::from_millis(500), "health took {:?}", t.elapsed());

    assert_eq!(busy.await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn index_serves_frontend_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>healthbeat</h1>").unwrap();
    let app = build_router(test_state(dir.path()));

    let resp = get_path(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
    assert!(ct.starts_with("text/html"), "{ct}");
    assert_eq!(body_bytes(resp).await, b"<h1>healthbeat</h1>");
}

#[tokio::test]
async fn index_missing_is_404_json() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(test_state(dir.path()));

    let resp = get_path(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, json!({ "error": "Not found" }));
}

async fn boom() -> &'static str {
    panic!("boom")
}

#[tokio::test]
async fn handler_panic_becomes_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = service_router(api_routes().route("/boom", get(boom)), state.clone());

    let resp = get_path(&app, "/boom").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await, json!({ "error": "Internal server error" }));
    assert_eq!(state.request_count(), 1);

    // The service keeps working afterwards.
    assert_eq!(get_path(&app, "/api/health").await.status(), StatusCode::OK);
}
