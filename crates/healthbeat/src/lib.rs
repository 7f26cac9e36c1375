//! Top-level facade crate for healthbeat.
//!
//! Re-exports core types and the service library so users can depend on a single crate.

pub mod core {
    pub use healthbeat_core::*;
}

pub mod service {
    pub use healthbeat_service::*;
}
