//! Shared error type across healthbeat crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Unified error type used by core and service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,
    #[error("simulated error")]
    Simulated,
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::NotFound => 404,
            ServiceError::Simulated | ServiceError::Config(_) | ServiceError::Internal(_) => 500,
        }
    }

    /// Fixed message exposed to clients. Never carries internal detail.
    pub fn client_message(&self) -> &'static str {
        match self {
            ServiceError::NotFound => "Not found",
            ServiceError::Simulated => "Simulated error",
            ServiceError::Config(_) | ServiceError::Internal(_) => "Internal server error",
        }
    }
}
