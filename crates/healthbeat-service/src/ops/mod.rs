//! HTTP endpoints.
//!
//! - `/`            : frontend entry document
//! - `/api/health`  : liveness + uptime
//! - `/api/metrics` : JSON snapshot of counters and host usage
//! - `/metrics`     : Prometheus text format
//! - `/api/load`    : one burst of synthetic CPU load
//! - `/api/error`   : always 500, for failure-path testing

pub mod frontend;

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use healthbeat_core::error::ServiceError;
use healthbeat_core::load::generate_load;

use crate::app_state::AppState;
use crate::error::ApiError;

pub use frontend::index;

pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const STATUS_HEALTHY: &str = "healthy";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub uptime: f64,
    pub timestamp: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub requests: u64,
    pub uptime: f64,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub message: &'static str,
    pub duration: f64,
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: STATUS_HEALTHY,
        message: "Backend service is running",
        uptime: state.uptime().as_secs_f64(),
        timestamp: unix_now(),
    })
}

pub async fn api_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let (cpu_percent, memory_bytes) = state.refresh_system_gauges();
    state.metrics().set_active_connections(state.active_connections());

    Json(MetricsResponse {
        requests: state.request_count(),
        uptime: state.uptime().as_secs_f64(),
        cpu_percent,
        memory_mb: memory_bytes as f64 / 1024.0 / 1024.0,
        status: STATUS_HEALTHY,
    })
}

pub async fn prometheus(State(state): State<AppState>) -> Response {
    state.refresh_system_gauges();
    let body = state.metrics().render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

pub async fn load(State(state): State<AppState>) -> Result<Json<LoadResponse>, ApiError> {
    let duration = state.cfg().load_duration();
    // CPU bound; keep it off the async workers.
    let elapsed = tokio::task::spawn_blocking(move || generate_load(duration))
        .await
        .map_err(|e| ServiceError::Internal(format!("load worker failed: {e}")))?;

    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "load generated");
    Ok(Json(LoadResponse {
        message: "Load generated successfully",
        duration: elapsed.as_secs_f64(),
    }))
}

pub async fn simulate_error() -> ApiError {
    ApiError(ServiceError::Simulated)
}

pub async fn not_found() -> ApiError {
    ApiError(ServiceError::NotFound)
}
