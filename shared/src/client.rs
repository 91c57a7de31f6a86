//! Auth DTOs shared between the client and the backend
//!
//! Request/response types for the login flow. The backend wraps these
//! in [`crate::response::ApiEnvelope`].

use serde::{Deserialize, Serialize};

// Re-export the envelope for convenience
pub use crate::response::ApiEnvelope;

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub admin: Admin,
}

/// Authenticated administrator profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
