//! Division model

use serde::{Deserialize, Serialize};

/// Organizational division, read-only from the client side
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Division {
    pub id: String,
    pub name: String,
}

/// `data` payload of `GET /divisions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionList {
    pub divisions: Vec<Division>,
}
