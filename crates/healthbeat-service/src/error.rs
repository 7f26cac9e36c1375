//! HTTP mapping for `ServiceError`.
//!
//! Clients only ever see `{"error": <fixed message>}`; the detail goes to the
//! log.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use healthbeat_core::error::ServiceError;

#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match &self.0 {
            ServiceError::NotFound => tracing::debug!("not found"),
            ServiceError::Simulated => tracing::warn!("simulated error requested"),
            e => tracing::error!(error = %e, "request failed"),
        }
        let body = Json(json!({ "error": self.0.client_message() }));
        (status, body).into_response()
    }
}

/// Turn a handler panic into the generic 500 body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError(ServiceError::Internal(format!("handler panicked: {detail}"))).into_response()
}
