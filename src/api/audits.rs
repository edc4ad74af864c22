use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::infrastructure::auth::Claims;
use crate::models::audit::AuditDto;
use crate::services::audit_service::{self, AuditFilter};

pub async fn list_audits(
    State(db): State<DatabaseConnection>,
    Query(filter): Query<AuditFilter>,
) -> impl IntoResponse {
    match audit_service::list_audits(&db, filter).await {
        Ok(audits) => Json(json!({
            "total": audits.len(),
            "audits": audits
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_audit(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<AuditDto>,
) -> impl IntoResponse {
    match audit_service::record_audit(&db, payload, Some(claims.username())).await {
        Ok(audit) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Audit recorded",
                "audit": audit
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn audit_summary(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match audit_service::audit_summary(&db).await {
        Ok(summary) => Json(json!(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_audit(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match audit_service::delete_audit(&db, id, Some(claims.username())).await {
        Ok(()) => Json(json!({ "message": "Audit deleted" })).into_response(),
        Err(e) => e.into_response(),
    }
}
