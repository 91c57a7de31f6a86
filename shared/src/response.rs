//! API response types
//!
//! Standardized response envelope used by every backend endpoint.

use serde::{Deserialize, Serialize};

/// Status string carried by successful responses
pub const STATUS_SUCCESS: &str = "success";

/// Unified API response envelope
///
/// All API responses follow this format:
/// ```json
/// {
///     "status": "success",
///     "message": "Data retrieved",
///     "data": { ... },
///     "pagination": { ... }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// "success" or an error status
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Response data (absent on errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Paging metadata (list endpoints only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful response
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            data: Some(data),
            pagination: None,
        }
    }

    /// Create a successful list response with paging metadata
    pub fn ok_paginated(message: impl Into<String>, data: T, pagination: Pagination) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            data: Some(data),
            pagination: Some(pagination),
        }
    }

    /// Create a successful response with no data
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            data: None,
            pagination: None,
        }
    }

    /// Create an error response
    pub fn error(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            data: None,
            pagination: None,
        }
    }

    /// Whether the envelope reports success
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Paging metadata, Laravel paginator shape
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-based)
    pub current_page: u64,
    /// Last available page (at least 1)
    pub last_page: u64,
    /// 1-based offset of the first row on this page, null when the page is empty
    #[serde(default)]
    pub from: Option<u64>,
    /// Items per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
    /// Total matching rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl Pagination {
    /// Compute paging metadata for a page out of `total` matching rows
    pub fn new(current_page: u64, per_page: u64, total: u64) -> Self {
        let last_page = if per_page == 0 {
            1
        } else {
            std::cmp::max(1, total.div_ceil(per_page))
        };
        let offset = current_page.saturating_sub(1) * per_page;
        let from = if total == 0 || offset >= total {
            None
        } else {
            Some(offset + 1)
        };
        Self {
            current_page,
            last_page,
            from,
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    /// Whether a next page exists
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    /// Whether a previous page exists
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_math() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.last_page, 3);
        assert_eq!(p.from, Some(1));
        assert!(p.has_next());
        assert!(!p.has_prev());

        let p = Pagination::new(3, 10, 25);
        assert_eq!(p.from, Some(21));
        assert!(!p.has_next());
        assert!(p.has_prev());
    }

    #[test]
    fn pagination_empty_result() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.last_page, 1);
        assert_eq!(p.from, None);
        assert!(!p.has_next());
    }

    #[test]
    fn pagination_past_the_end() {
        let p = Pagination::new(5, 10, 25);
        assert_eq!(p.from, None);
        assert!(!p.has_next());
    }

    #[test]
    fn envelope_roundtrip() {
        let body = r#"{"status":"success","message":"ok","data":{"token":"t"},"pagination":null}"#;
        let env: ApiEnvelope<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(env.is_success());
        assert_eq!(env.data.unwrap()["token"], "t");
        assert!(env.pagination.is_none());
    }

    #[test]
    fn envelope_error_has_no_data() {
        let env = ApiEnvelope::<()>::error("error", "Unauthenticated.");
        assert!(!env.is_success());
        let json = serde_json::to_string(&env).unwrap();
        assert!(!json.contains("\"data\""));
    }

    // The payload type deliberately lacks Default: the envelope must
    // deserialize for any payload, with or without the data key.
    #[test]
    fn envelope_data_needs_no_default() {
        #[derive(Deserialize)]
        struct Credentials {
            token: String,
        }

        let body = r#"{"status":"success","message":"ok","data":{"token":"t"}}"#;
        let env: ApiEnvelope<Credentials> = serde_json::from_str(body).unwrap();
        assert_eq!(env.data.unwrap().token, "t");

        let body = r#"{"status":"error","message":"Unauthenticated."}"#;
        let env: ApiEnvelope<Credentials> = serde_json::from_str(body).unwrap();
        assert!(env.data.is_none());
        assert!(env.pagination.is_none());
    }
}
