//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the documented envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Backend rejected the request; message comes from the response envelope
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// Non-success status with an unusable body
    #[error("HTTP {0}")]
    Status(StatusCode),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Message carried in the backend's response envelope, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether the backend rejected the session token or credentials
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => *status == StatusCode::UNAUTHORIZED,
            ClientError::Status(status) => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
