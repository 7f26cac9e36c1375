use std::io;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use healthbeat_core::error::ServiceError;

use crate::app_state::AppState;
use crate::error::ApiError;

pub const INDEX_FILE: &str = "index.html";

/// Serve `index.html` from the configured frontend directory.
pub async fn index(State(state): State<AppState>) -> Result<Response, ApiError> {
    let path = state.cfg().service.frontend_dir.join(INDEX_FILE);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ServiceError::NotFound.into()),
        Err(e) => Err(ServiceError::Internal(format!("read {} failed: {e}", path.display())).into()),
    }
}
