//! Orgdesk Client - typed HTTP client for the Orgdesk backend
//!
//! Provides network-based calls to the division and employee API with a
//! typestate session: protected endpoints only exist on a client value
//! that went through `login()`.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{OrgdeskClient, Page};
pub use error::{ClientError, ClientResult};
pub use http::HttpTransport;
pub use types::{Anonymous, Authenticated, Session};

// Re-export shared types for convenience
pub use shared::client::{Admin, LoginData, LoginRequest};
