//! List query parameters
//!
//! Query state for the list endpoints. The same types serve both sides:
//! the client serializes them into a query string, the mock backend
//! deserializes them from one. Empty filters are omitted on the wire.

use serde::{Deserialize, Serialize};

fn default_page() -> u64 {
    1
}

/// Query parameters for `GET /divisions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DivisionQuery {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    pub page: u64,
    /// Name filter (substring match, case-insensitive)
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for DivisionQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            name: None,
        }
    }
}

impl DivisionQuery {
    /// Serialize into a request query string, omitting empty filters
    pub fn query_string(&self) -> String {
        let mut qs = format!("page={}", self.page);
        push_param(&mut qs, "name", self.name.as_deref());
        qs
    }
}

/// Query parameters for `GET /employees`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeQuery {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    pub page: u64,
    /// Name filter (substring match, case-insensitive)
    #[serde(default)]
    pub name: Option<String>,
    /// Division filter (exact id match)
    #[serde(default)]
    pub division_id: Option<String>,
}

impl Default for EmployeeQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            name: None,
            division_id: None,
        }
    }
}

impl EmployeeQuery {
    /// Serialize into a request query string, omitting empty filters
    pub fn query_string(&self) -> String {
        let mut qs = format!("page={}", self.page);
        push_param(&mut qs, "name", self.name.as_deref());
        push_param(&mut qs, "division_id", self.division_id.as_deref());
        qs
    }
}

fn push_param(qs: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            qs.push('&');
            qs.push_str(key);
            qs.push('=');
            qs.push_str(&urlencoding::encode(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_query_defaults_to_page_one() {
        let q = DivisionQuery::default();
        assert_eq!(q.query_string(), "page=1");
    }

    #[test]
    fn empty_filters_are_omitted() {
        let q = EmployeeQuery {
            page: 3,
            name: Some(String::new()),
            division_id: None,
        };
        assert_eq!(q.query_string(), "page=3");
    }

    #[test]
    fn filters_are_url_encoded() {
        let q = EmployeeQuery {
            page: 1,
            name: Some("van der".into()),
            division_id: Some("d1".into()),
        };
        assert_eq!(q.query_string(), "page=1&name=van%20der&division_id=d1");
    }

    #[test]
    fn deserializes_with_missing_params() {
        let q: EmployeeQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert!(q.name.is_none());
        assert!(q.division_id.is_none());
    }
}
