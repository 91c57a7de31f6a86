//! Shared types for the Orgdesk console
//!
//! Wire-format types used by the client, the console and the mock
//! backend: models, auth DTOs, list queries and the response envelope.

pub mod client;
pub mod models;
pub mod request;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use client::{Admin, LoginData, LoginRequest};
pub use models::{Division, DivisionList, Employee, EmployeeData, EmployeeList, EmployeePayload};
pub use request::{DivisionQuery, EmployeeQuery};
pub use response::{ApiEnvelope, Pagination, STATUS_SUCCESS};
