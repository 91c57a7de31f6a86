//! Data models
//!
//! Shared between the mock backend and the console (via the API).
//! All IDs are opaque strings owned by the backend.

pub mod division;
pub mod employee;

// Re-exports
pub use division::*;
pub use employee::*;
