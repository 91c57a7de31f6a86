//! Orgdesk Mock - in-memory stand-in for the Orgdesk backend
//!
//! Serves the documented division and employee API for development and
//! integration tests. Usable as a library (hand the router to an
//! in-process listener) or as the `orgdesk-mock` binary.

pub mod api;
pub mod state;

pub use api::router;
pub use state::{AppState, PAGE_SIZE};
