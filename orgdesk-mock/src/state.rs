//! In-memory state for the mock backend
//!
//! Holds the seeded admin account, the read-only division catalog, the
//! mutable employee records and the set of issued bearer tokens.

use std::collections::HashSet;

use shared::client::Admin;
use shared::models::{Division, Employee, EmployeePayload};
use shared::request::{DivisionQuery, EmployeeQuery};
use shared::response::Pagination;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Rows per page on the list endpoints
pub const PAGE_SIZE: u64 = 10;

/// Shared application state
pub struct AppState {
    admin_username: String,
    admin_password: String,
    admin: Admin,
    /// Issued bearer tokens; logout removes the entry
    tokens: RwLock<HashSet<String>>,
    /// Division catalog, read-only through the API
    divisions: Vec<Division>,
    employees: RwLock<Vec<Employee>>,
}

impl AppState {
    /// Create a state seeded with the demo account, divisions and a
    /// couple of pages of employees.
    pub fn seeded() -> Self {
        let divisions: Vec<Division> = [
            "Mobile Apps",
            "QA",
            "Full Stack",
            "Backend",
            "Frontend",
            "UI/UX Designer",
        ]
        .iter()
        .map(|name| Division {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        })
        .collect();

        let seed_rows: &[(&str, &str, usize, &str)] = &[
            ("Alice Johnson", "081234567001", 0, "Android Developer"),
            ("Bob Smith", "081234567002", 1, "QA Engineer"),
            ("Clara Davis", "081234567003", 2, "Full Stack Developer"),
            ("Daniel Evans", "081234567004", 3, "Backend Engineer"),
            ("Eva Martin", "081234567005", 4, "Frontend Developer"),
            ("Frank Moore", "081234567006", 5, "Product Designer"),
            ("Grace Lee", "081234567007", 3, "Backend Engineer"),
            ("Henry Clark", "081234567008", 1, "Test Automation Engineer"),
            ("Isabel Reed", "081234567009", 0, "iOS Developer"),
            ("Jack Turner", "081234567010", 4, "Frontend Developer"),
            ("Karen White", "081234567011", 2, "Full Stack Developer"),
            ("Liam Walker", "081234567012", 5, "UX Researcher"),
        ];

        let employees = seed_rows
            .iter()
            .enumerate()
            .map(|(i, (name, phone, division_idx, position))| Employee {
                id: Uuid::new_v4().to_string(),
                image: format!("https://randomuser.me/api/portraits/men/{}.jpg", i + 1),
                name: name.to_string(),
                phone: phone.to_string(),
                division: divisions[*division_idx].clone(),
                position: position.to_string(),
            })
            .collect();

        Self {
            admin_username: "admin".to_string(),
            admin_password: "pastibisa".to_string(),
            admin: Admin {
                id: Uuid::new_v4().to_string(),
                name: "Administrator".to_string(),
                username: "admin".to_string(),
                email: Some("admin@example.com".to_string()),
                phone: Some("081234567890".to_string()),
            },
            tokens: RwLock::new(HashSet::new()),
            divisions,
            employees: RwLock::new(employees),
        }
    }

    // ========== Auth ==========

    /// Check credentials, returning the admin profile on a match
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Admin> {
        if username == self.admin_username && password == self.admin_password {
            Some(self.admin.clone())
        } else {
            None
        }
    }

    /// Issue a fresh opaque bearer token
    pub async fn issue_token(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone());
        token
    }

    /// Remove a token; returns false if it was never issued
    pub async fn revoke_token(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token)
    }

    /// Whether the token is currently valid
    pub async fn token_valid(&self, token: &str) -> bool {
        self.tokens.read().await.contains(token)
    }

    // ========== Divisions ==========

    /// Look up a division by id
    pub fn division(&self, id: &str) -> Option<Division> {
        self.divisions.iter().find(|d| d.id == id).cloned()
    }

    /// Filter and paginate the division catalog
    pub fn page_divisions(&self, query: &DivisionQuery) -> (Vec<Division>, Pagination) {
        let filtered: Vec<Division> = self
            .divisions
            .iter()
            .filter(|d| matches_filter(&d.name, query.name.as_deref()))
            .cloned()
            .collect();
        paginate(filtered, query.page)
    }

    // ========== Employees ==========

    /// Filter and paginate the employee records
    pub async fn page_employees(&self, query: &EmployeeQuery) -> (Vec<Employee>, Pagination) {
        let employees = self.employees.read().await;
        let division_id = query
            .division_id
            .as_deref()
            .filter(|id| !id.is_empty());
        let filtered: Vec<Employee> = employees
            .iter()
            .filter(|e| matches_filter(&e.name, query.name.as_deref()))
            .filter(|e| division_id.is_none_or(|id| e.division.id == id))
            .cloned()
            .collect();
        paginate(filtered, query.page)
    }

    /// Insert a new employee built from a validated payload
    pub async fn create_employee(&self, payload: &EmployeePayload, division: Division) -> Employee {
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            image: payload.image.clone(),
            name: payload.name.clone(),
            phone: payload.phone.clone(),
            division,
            position: payload.position.clone(),
        };
        self.employees.write().await.push(employee.clone());
        employee
    }

    /// Whether an employee with this id exists
    pub async fn employee_exists(&self, id: &str) -> bool {
        self.employees.read().await.iter().any(|e| e.id == id)
    }

    /// Overwrite an existing employee from a validated payload
    pub async fn update_employee(
        &self,
        id: &str,
        payload: &EmployeePayload,
        division: Division,
    ) -> Option<Employee> {
        let mut employees = self.employees.write().await;
        let employee = employees.iter_mut().find(|e| e.id == id)?;
        employee.image = payload.image.clone();
        employee.name = payload.name.clone();
        employee.phone = payload.phone.clone();
        employee.division = division;
        employee.position = payload.position.clone();
        Some(employee.clone())
    }

    /// Remove an employee; returns false if the id is unknown
    pub async fn delete_employee(&self, id: &str) -> bool {
        let mut employees = self.employees.write().await;
        let before = employees.len();
        employees.retain(|e| e.id != id);
        employees.len() != before
    }
}

/// Case-insensitive substring match; an empty or missing filter matches all
fn matches_filter(haystack: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(f) if !f.is_empty() => haystack.to_lowercase().contains(&f.to_lowercase()),
        _ => true,
    }
}

/// Slice out one page and compute its metadata
fn paginate<T>(items: Vec<T>, page: u64) -> (Vec<T>, Pagination) {
    let page = page.max(1);
    let total = items.len() as u64;
    let pagination = Pagination::new(page, PAGE_SIZE, total);
    let page_items = items
        .into_iter()
        .skip(((page - 1) * PAGE_SIZE) as usize)
        .take(PAGE_SIZE as usize)
        .collect();
    (page_items, pagination)
}
