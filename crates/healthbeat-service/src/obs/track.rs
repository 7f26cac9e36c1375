use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

/// `endpoint` label for requests that matched no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Pre-routing hook: count the request, label it by method and matched route,
/// then time the rest of the stack.
pub async fn track_request(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_owned());

    let n = state.record_request();
    state.metrics().record_request(&method, &endpoint);

    let started = Instant::now();
    let resp = next.run(req).await;
    let elapsed = started.elapsed();
    state.metrics().observe_duration(elapsed);

    tracing::debug!(
        request = n,
        %method,
        %endpoint,
        status = resp.status().as_u16(),
        elapsed_us = elapsed.as_micros() as u64,
        "request done"
    );
    resp
}
