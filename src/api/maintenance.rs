use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::infrastructure::auth::Claims;
use crate::models::maintenance::MaintenanceDto;
use crate::services::maintenance_service::{
    self, CompleteMaintenanceDto, MaintenanceFilter, UpdateMaintenanceDto,
};

pub async fn list_maintenance(
    State(db): State<DatabaseConnection>,
    Query(filter): Query<MaintenanceFilter>,
) -> impl IntoResponse {
    match maintenance_service::list_maintenance(&db, filter).await {
        Ok(records) => Json(json!({
            "total": records.len(),
            "maintenance": records
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_maintenance(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match maintenance_service::get_maintenance(&db, id).await {
        Ok(record) => Json(json!({ "maintenance": record })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn schedule_maintenance(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<MaintenanceDto>,
) -> impl IntoResponse {
    match maintenance_service::schedule_maintenance(&db, payload, Some(claims.username())).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Maintenance scheduled",
                "maintenance": record
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_maintenance(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMaintenanceDto>,
) -> impl IntoResponse {
    match maintenance_service::update_maintenance(&db, id, payload, Some(claims.username())).await
    {
        Ok(record) => Json(json!({
            "message": "Maintenance updated",
            "maintenance": record
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn start_maintenance(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match maintenance_service::start_maintenance(&db, id, Some(claims.username())).await {
        Ok(record) => Json(json!({
            "message": "Maintenance started",
            "maintenance": record
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn complete_maintenance(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    payload: Option<Json<CompleteMaintenanceDto>>,
) -> impl IntoResponse {
    let dto = payload.map(|Json(dto)| dto).unwrap_or_default();
    match maintenance_service::complete_maintenance(&db, id, dto, Some(claims.username())).await {
        Ok(record) => Json(json!({
            "message": "Maintenance completed",
            "maintenance": record
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn cancel_maintenance(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match maintenance_service::cancel_maintenance(&db, id, Some(claims.username())).await {
        Ok(record) => Json(json!({
            "message": "Maintenance cancelled",
            "maintenance": record
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
