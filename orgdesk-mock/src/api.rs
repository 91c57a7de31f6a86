//! Mock API routes
//!
//! Implements the documented backend surface: login/logout, the
//! division list and employee CRUD, all wrapped in the standard
//! response envelope with real HTTP status codes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use shared::client::{LoginData, LoginRequest};
use shared::models::{DivisionList, EmployeeData, EmployeeList, EmployeePayload};
use shared::request::{DivisionQuery, EmployeeQuery};
use shared::response::{ApiEnvelope, Pagination};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;

use crate::state::AppState;

// ============================================================================
// Response helpers
// ============================================================================

fn ok_response<T: serde::Serialize>(message: &str, data: T) -> Response {
    (StatusCode::OK, Json(ApiEnvelope::ok(message, data))).into_response()
}

fn ok_paginated<T: serde::Serialize>(message: &str, data: T, pagination: Pagination) -> Response {
    (
        StatusCode::OK,
        Json(ApiEnvelope::ok_paginated(message, data, pagination)),
    )
        .into_response()
}

fn created_response<T: serde::Serialize>(message: &str, data: T) -> Response {
    (StatusCode::CREATED, Json(ApiEnvelope::ok(message, data))).into_response()
}

fn message_response(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(ApiEnvelope::<serde_json::Value>::ok_empty(message)),
    )
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ApiEnvelope::<serde_json::Value>::error("error", message)),
    )
        .into_response()
}

/// First message out of a validation failure, Laravel style
fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "The given data was invalid.".to_string())
}

// ============================================================================
// Auth
// ============================================================================

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// Reject the request unless it carries a valid bearer token
async fn require_token(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    match bearer_token(headers) {
        Some(token) if state.token_valid(token).await => Ok(()),
        _ => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Unauthenticated.",
        )),
    }
}

async fn login(State(state): State<Arc<AppState>>, Json(req): Json<LoginRequest>) -> Response {
    match state.authenticate(&req.username, &req.password) {
        Some(admin) => {
            let token = state.issue_token().await;
            tracing::info!("Admin {} logged in", req.username);
            ok_response("Login success", LoginData { token, admin })
        }
        None => {
            tracing::warn!("Rejected login for {}", req.username);
            error_response(StatusCode::UNAUTHORIZED, "Invalid username or password")
        }
    }
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match bearer_token(&headers) {
        Some(token) if state.revoke_token(token).await => {
            tracing::info!("Admin logged out");
            message_response("Logout success")
        }
        _ => error_response(StatusCode::UNAUTHORIZED, "Unauthenticated."),
    }
}

// ============================================================================
// Divisions
// ============================================================================

async fn list_divisions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DivisionQuery>,
) -> Response {
    if let Err(resp) = require_token(&state, &headers).await {
        return resp;
    }
    let (divisions, pagination) = state.page_divisions(&query);
    ok_paginated("Divisions retrieved", DivisionList { divisions }, pagination)
}

// ============================================================================
// Employees
// ============================================================================

async fn list_employees(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<EmployeeQuery>,
) -> Response {
    if let Err(resp) = require_token(&state, &headers).await {
        return resp;
    }
    let (employees, pagination) = state.page_employees(&query).await;
    ok_paginated("Employees retrieved", EmployeeList { employees }, pagination)
}

async fn create_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<EmployeePayload>,
) -> Response {
    if let Err(resp) = require_token(&state, &headers).await {
        return resp;
    }
    if let Err(errors) = payload.validate() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &validation_message(&errors),
        );
    }
    let division = match state.division(&payload.division_id) {
        Some(division) => division,
        None => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "The selected division id is invalid.",
            );
        }
    };

    let employee = state.create_employee(&payload, division).await;
    tracing::info!("Created employee {} ({})", employee.name, employee.id);
    created_response("Employee created", EmployeeData { employee })
}

async fn update_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<EmployeePayload>,
) -> Response {
    if let Err(resp) = require_token(&state, &headers).await {
        return resp;
    }
    if !state.employee_exists(&id).await {
        return error_response(StatusCode::NOT_FOUND, "Employee not found");
    }
    if let Err(errors) = payload.validate() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &validation_message(&errors),
        );
    }
    let division = match state.division(&payload.division_id) {
        Some(division) => division,
        None => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "The selected division id is invalid.",
            );
        }
    };

    match state.update_employee(&id, &payload, division).await {
        Some(employee) => {
            tracing::info!("Updated employee {}", id);
            ok_response("Employee updated", EmployeeData { employee })
        }
        None => error_response(StatusCode::NOT_FOUND, "Employee not found"),
    }
}

async fn delete_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = require_token(&state, &headers).await {
        return resp;
    }
    if state.delete_employee(&id).await {
        tracing::info!("Deleted employee {}", id);
        message_response("Employee deleted")
    } else {
        error_response(StatusCode::NOT_FOUND, "Employee not found")
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/divisions", get(list_divisions))
        .route("/api/employees", get(list_employees).post(create_employee))
        .route(
            "/api/employees/{id}",
            put(update_employee).delete(delete_employee),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
