//! Employee API handlers using repository pattern

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::error::{domain_error, not_found};
use crate::domain::{EmployeeFilter, EmployeeInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::activity;

pub async fn list_employees(
    State(state): State<AppState>,
    Query(filter): Query<EmployeeFilter>,
) -> impl IntoResponse {
    match state.employee_repo.find_all(filter).await {
        Ok(employees) => Json(json!({
            "total": employees.len(),
            "employees": employees
        }))
        .into_response(),
        Err(e) => domain_error(e, "Employee"),
    }
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.employee_repo.find_by_id(id).await {
        Ok(Some(employee)) => Json(json!({ "employee": employee })).into_response(),
        Ok(None) => not_found("Employee"),
        Err(e) => domain_error(e, "Employee"),
    }
}

pub async fn create_employee(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<EmployeeInput>,
) -> impl IntoResponse {
    match state.employee_repo.create(payload).await {
        Ok(employee) => {
            activity::record(
                state.db(),
                "employee",
                employee.id,
                "create",
                Some(json!(employee)),
                Some(claims.username()),
            )
            .await;
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Employee created successfully",
                    "employee": employee
                })),
            )
                .into_response()
        }
        Err(e) => domain_error(e, "Employee"),
    }
}

pub async fn update_employee(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<EmployeeInput>,
) -> impl IntoResponse {
    match state.employee_repo.update(id, payload).await {
        Ok(employee) => {
            activity::record(
                state.db(),
                "employee",
                id,
                "update",
                Some(json!(employee)),
                Some(claims.username()),
            )
            .await;
            Json(json!({
                "message": "Employee updated successfully",
                "employee": employee
            }))
            .into_response()
        }
        Err(e) => domain_error(e, "Employee"),
    }
}

/// Deactivates the employee; history stays attached.
pub async fn delete_employee(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.employee_repo.deactivate(id).await {
        Ok(()) => {
            activity::record(state.db(), "employee", id, "deactivate", None, Some(claims.username()))
                .await;
            Json(json!({ "message": "Employee deactivated" })).into_response()
        }
        Err(e) => domain_error(e, "Employee"),
    }
}
