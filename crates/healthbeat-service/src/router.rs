//! Axum router wiring.
//!
//! Layer order, outermost first: panic catcher, HTTP trace span, request
//! tracking hook, then the routes or the 404 fallback.

use axum::{middleware, routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{app_state::AppState, error, obs, ops};

pub fn build_router(state: AppState) -> Router {
    service_router(api_routes(), state)
}

/// The fixed route table.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ops::index))
        .route("/api/health", get(ops::health))
        .route("/api/metrics", get(ops::api_metrics))
        .route("/metrics", get(ops::prometheus))
        .route("/api/load", get(ops::load))
        .route("/api/error", get(ops::simulate_error))
}

/// Wrap `routes` with the fallback and the cross-cutting layers.
///
/// The tracking hook is added after the fallback so unmatched requests are
/// counted too.
pub fn service_router(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(ops::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), obs::track_request))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .with_state(state)
}
