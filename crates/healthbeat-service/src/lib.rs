//! healthbeat service library entry.
//!
//! Wires config, shared state, the request-tracking hook and the route
//! handlers into an axum router. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
