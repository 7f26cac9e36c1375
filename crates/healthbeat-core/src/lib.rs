//! healthbeat core: transport-agnostic building blocks for the service.
//!
//! This crate holds the error taxonomy, the in-process metric registry with its
//! Prometheus text rendering, the system-metrics probe and the CPU load
//! generator. It carries no HTTP or runtime dependencies so the service crate
//! and tests can use it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ServiceError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod load;
pub mod metrics;
pub mod system;

/// Shared result type.
pub use error::{Result, ServiceError};
