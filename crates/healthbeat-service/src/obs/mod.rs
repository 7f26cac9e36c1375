//! Request observation.
//!
//! The tracking hook runs in front of every route and the fallback. Metric
//! storage itself lives in `healthbeat_core::metrics`.

pub mod track;

pub use track::{track_request, UNMATCHED_ENDPOINT};
