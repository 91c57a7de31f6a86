//! Background request tasks.
//!
//! Every backend call runs in a spawned task and reports back over the
//! event channel, keeping the draw loop responsive. Tasks take client
//! clones; the login and logout transitions carry the client itself and
//! hand it back with the result.

use orgdesk_client::{Anonymous, Authenticated, ClientError, OrgdeskClient, Page};
use shared::models::{Division, Employee, EmployeePayload};
use shared::request::{DivisionQuery, EmployeeQuery};
use tokio::sync::mpsc;

/// Failure report from a background request.
#[derive(Debug, Clone)]
pub struct RequestError {
    /// Message to surface in the UI: the backend's own message when it
    /// sent one, otherwise a generic fallback.
    pub message: String,
    /// True when the backend rejected the session token.
    pub unauthorized: bool,
}

impl RequestError {
    fn from_client(err: &ClientError, fallback: &str) -> Self {
        let message = err
            .server_message()
            .map(|m| m.to_string())
            .unwrap_or_else(|| fallback.to_string());
        Self {
            message,
            unauthorized: err.is_unauthorized(),
        }
    }
}

/// Results reported by background tasks.
pub enum AppEvent {
    LoginDone(Result<Box<OrgdeskClient<Authenticated>>, (String, Box<OrgdeskClient<Anonymous>>)>),
    LoggedOut(Box<OrgdeskClient<Anonymous>>),
    DivisionsLoaded(Result<Page<Division>, RequestError>),
    /// Unfiltered division list backing the filter and form selects.
    DivisionOptionsLoaded(Result<Page<Division>, RequestError>),
    EmployeesLoaded(Result<Page<Employee>, RequestError>),
    EmployeeSaved(Result<Employee, RequestError>),
    EmployeeDeleted(Result<(), RequestError>),
}

pub fn spawn_login(
    tx: mpsc::Sender<AppEvent>,
    client: OrgdeskClient<Anonymous>,
    username: String,
    password: String,
) {
    tokio::spawn(async move {
        let result = match client.login(&username, &password).await {
            Ok(client) => Ok(Box::new(client)),
            Err((err, client)) => {
                tracing::warn!("Login failed: {}", err);
                let message = err
                    .server_message()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Login failed".to_string());
                Err((message, Box::new(client)))
            }
        };
        let _ = tx.send(AppEvent::LoginDone(result)).await;
    });
}

pub fn spawn_logout(tx: mpsc::Sender<AppEvent>, client: OrgdeskClient<Authenticated>) {
    tokio::spawn(async move {
        let client = client.logout().await;
        let _ = tx.send(AppEvent::LoggedOut(Box::new(client))).await;
    });
}

pub fn spawn_divisions(
    tx: mpsc::Sender<AppEvent>,
    client: OrgdeskClient<Authenticated>,
    query: DivisionQuery,
) {
    tokio::spawn(async move {
        let result = client
            .list_divisions(&query)
            .await
            .map_err(|e| RequestError::from_client(&e, "Failed to load divisions"));
        let _ = tx.send(AppEvent::DivisionsLoaded(result)).await;
    });
}

pub fn spawn_division_options(tx: mpsc::Sender<AppEvent>, client: OrgdeskClient<Authenticated>) {
    tokio::spawn(async move {
        let result = client
            .list_divisions(&DivisionQuery::default())
            .await
            .map_err(|e| RequestError::from_client(&e, "Failed to load divisions"));
        let _ = tx.send(AppEvent::DivisionOptionsLoaded(result)).await;
    });
}

pub fn spawn_employees(
    tx: mpsc::Sender<AppEvent>,
    client: OrgdeskClient<Authenticated>,
    query: EmployeeQuery,
) {
    tokio::spawn(async move {
        let result = client
            .list_employees(&query)
            .await
            .map_err(|e| RequestError::from_client(&e, "Failed to load employees"));
        let _ = tx.send(AppEvent::EmployeesLoaded(result)).await;
    });
}

/// Creates when `id` is `None`, updates otherwise.
pub fn spawn_save_employee(
    tx: mpsc::Sender<AppEvent>,
    client: OrgdeskClient<Authenticated>,
    id: Option<String>,
    payload: EmployeePayload,
) {
    tokio::spawn(async move {
        let result = match &id {
            Some(id) => client.update_employee(id, &payload).await,
            None => client.create_employee(&payload).await,
        }
        .map_err(|e| RequestError::from_client(&e, "Failed to save employee"));
        let _ = tx.send(AppEvent::EmployeeSaved(result)).await;
    });
}

pub fn spawn_delete_employee(
    tx: mpsc::Sender<AppEvent>,
    client: OrgdeskClient<Authenticated>,
    id: String,
) {
    tokio::spawn(async move {
        let result = client
            .delete_employee(&id)
            .await
            .map_err(|e| RequestError::from_client(&e, "Failed to delete employee"));
        let _ = tx.send(AppEvent::EmployeeDeleted(result)).await;
    });
}
