//! Typestate client for the backend API.
//!
//! This module defines the core `OrgdeskClient` struct and the state
//! transitions between anonymous and authenticated use.

use shared::client::{Admin, LoginData, LoginRequest};
use shared::models::{Division, DivisionList, Employee, EmployeeData, EmployeeList, EmployeePayload};
use shared::request::{DivisionQuery, EmployeeQuery};
use shared::response::Pagination;

use crate::error::{ClientError, ClientResult};
use crate::http::HttpTransport;
use crate::types::{Anonymous, Authenticated, ClientState, Session, StateMarker};

// ============================================================================
// Core OrgdeskClient Definition
// ============================================================================

/// A type-safe HTTP client for the Orgdesk backend.
///
/// `OrgdeskClient` uses the typestate pattern to ensure correct usage at
/// compile time: the `S` parameter specifies the current state
/// (`Anonymous` or `Authenticated`), and the protected endpoints only
/// exist on the authenticated client.
///
/// # States
///
/// - **Anonymous**: Initial state. Can call `login()`.
/// - **Authenticated**: Logged in. Can call the division/employee
///   endpoints and `logout()`.
///
/// # Example
///
/// ```no_run
/// use orgdesk_client::OrgdeskClient;
///
/// # async fn example() -> Result<(), orgdesk_client::ClientError> {
/// let client = OrgdeskClient::new("http://localhost:8000/api")?;
///
/// let client = match client.login("admin", "secret").await {
///     Ok(client) => client,
///     Err((err, _client)) => return Err(err),
/// };
///
/// let page = client.list_divisions(&Default::default()).await?;
/// println!("{} divisions", page.items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OrgdeskClient<S: ClientState = Anonymous> {
    #[allow(dead_code)] // Used for typestate pattern at compile time
    marker: StateMarker<S>,
    http: HttpTransport,
    session: Option<Session>,
}

impl<S: ClientState> Clone for OrgdeskClient<S> {
    /// Clones share the underlying connection pool and session token.
    fn clone(&self) -> Self {
        Self {
            marker: StateMarker::new(),
            http: self.http.clone(),
            session: self.session.clone(),
        }
    }
}

/// A fetched page of records plus the server's paging metadata
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Records on this page
    pub items: Vec<T>,
    /// Paging metadata, when the server sent any
    pub pagination: Option<Pagination>,
}

// ============================================================================
// Common Methods (Available in All States)
// ============================================================================

impl<S: ClientState> OrgdeskClient<S> {
    /// Returns the current session token, if available.
    pub fn token(&self) -> Option<&str> {
        self.http.token()
    }

    /// Checks if the client holds a session token.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Transforms the client to a new state (internal use only).
    fn transition<NewS: ClientState>(self) -> OrgdeskClient<NewS> {
        OrgdeskClient {
            marker: StateMarker::new(),
            http: self.http,
            session: self.session,
        }
    }
}

// ============================================================================
// Anonymous State
// ============================================================================

impl OrgdeskClient<Anonymous> {
    /// Creates a new anonymous client for the given base URL.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Ok(Self {
            marker: StateMarker::new(),
            http: HttpTransport::new(base_url)?,
            session: None,
        })
    }

    /// Restores an authenticated client from a persisted session.
    ///
    /// The token is trusted until the backend rejects it; a stale token
    /// surfaces as an unauthorized error on the first protected call.
    pub fn from_session(
        base_url: &str,
        session: Session,
    ) -> ClientResult<OrgdeskClient<Authenticated>> {
        let mut http = HttpTransport::new(base_url)?;
        http.set_token(session.token.clone());
        Ok(OrgdeskClient {
            marker: StateMarker::new(),
            http,
            session: Some(session),
        })
    }

    /// Logs in with administrator credentials.
    ///
    /// # Returns
    /// - `Ok(Authenticated)` on success
    /// - `Err((error, Anonymous))` on failure, returning the original
    ///   client for retry
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<OrgdeskClient<Authenticated>, (ClientError, Self)> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        tracing::info!("Logging in as {}", username);

        let envelope = match self.http.post::<LoginData, _>("login", &request).await {
            Ok(envelope) => envelope,
            Err(e) => return Err((e, self)),
        };

        let data = match envelope.data {
            Some(data) => data,
            None => {
                return Err((
                    ClientError::InvalidResponse("Missing login data".to_string()),
                    self,
                ));
            }
        };

        self.http.set_token(data.token.clone());
        self.session = Some(Session::new(data.token, data.admin));

        tracing::info!("Login successful");
        Ok(self.transition())
    }
}

// ============================================================================
// Authenticated State
// ============================================================================

impl OrgdeskClient<Authenticated> {
    /// Returns the active session.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns the signed-in administrator's profile.
    pub fn admin(&self) -> Option<&Admin> {
        self.session.as_ref().map(|s| &s.admin)
    }

    /// Fetches a page of divisions.
    pub async fn list_divisions(&self, query: &DivisionQuery) -> ClientResult<Page<Division>> {
        let path = format!("divisions?{}", query.query_string());
        let envelope = self.http.get::<DivisionList>(&path).await?;
        let data = envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing divisions data".to_string()))?;
        Ok(Page {
            items: data.divisions,
            pagination: envelope.pagination,
        })
    }

    /// Fetches a page of employees.
    pub async fn list_employees(&self, query: &EmployeeQuery) -> ClientResult<Page<Employee>> {
        let path = format!("employees?{}", query.query_string());
        let envelope = self.http.get::<EmployeeList>(&path).await?;
        let data = envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing employees data".to_string()))?;
        Ok(Page {
            items: data.employees,
            pagination: envelope.pagination,
        })
    }

    /// Creates an employee.
    pub async fn create_employee(&self, payload: &EmployeePayload) -> ClientResult<Employee> {
        let envelope = self.http.post::<EmployeeData, _>("employees", payload).await?;
        envelope
            .data
            .map(|d| d.employee)
            .ok_or_else(|| ClientError::InvalidResponse("Missing employee data".to_string()))
    }

    /// Updates an existing employee.
    pub async fn update_employee(
        &self,
        id: &str,
        payload: &EmployeePayload,
    ) -> ClientResult<Employee> {
        let path = format!("employees/{}", urlencoding::encode(id));
        let envelope = self.http.put::<EmployeeData, _>(&path, payload).await?;
        envelope
            .data
            .map(|d| d.employee)
            .ok_or_else(|| ClientError::InvalidResponse("Missing employee data".to_string()))
    }

    /// Deletes an employee.
    pub async fn delete_employee(&self, id: &str) -> ClientResult<()> {
        let path = format!("employees/{}", urlencoding::encode(id));
        self.http.delete::<serde_json::Value>(&path).await?;
        Ok(())
    }

    /// Logs out the administrator.
    ///
    /// The server call is best-effort: a failure is logged and the local
    /// session is dropped regardless.
    pub async fn logout(mut self) -> OrgdeskClient<Anonymous> {
        if let Err(e) = self.http.post_empty::<serde_json::Value>("logout").await {
            tracing::warn!("Logout request failed: {}", e);
        }
        self.session = None;
        self.http.clear_token();

        tracing::info!("Logged out");
        self.transition()
    }
}
