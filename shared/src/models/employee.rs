//! Employee model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::division::Division;

/// Employee record as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    /// Photo URL
    pub image: String,
    pub name: String,
    pub phone: String,
    /// Denormalized division reference
    pub division: Division,
    pub position: String,
}

/// `data` payload of `GET /employees`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeList {
    pub employees: Vec<Employee>,
}

/// `data` payload of employee create/update responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeData {
    pub employee: Employee,
}

/// Write payload for `POST /employees` and `PUT /employees/{id}`
///
/// All fields are required; the backend re-validates and additionally
/// checks that `division_id` references an existing division.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EmployeePayload {
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "division is required"))]
    pub division_id: String,
    #[validate(length(min = 1, message = "position is required"))]
    pub position: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_requires_every_field() {
        let payload = EmployeePayload {
            image: "https://example.com/p.jpg".into(),
            name: "Alice".into(),
            phone: "0812".into(),
            division_id: "d1".into(),
            position: "Backend".into(),
        };
        assert!(payload.validate().is_ok());

        let blank = EmployeePayload {
            name: String::new(),
            ..payload
        };
        assert!(blank.validate().is_err());
    }
}
