//! HTTP mapping of domain and service errors: `{"error": "..."}` bodies

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::services::ServiceError;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidState(_) | ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        domain_error(self, "Resource")
    }
}

/// Map a repository error, naming the entity in 404 bodies
pub fn domain_error(e: DomainError, entity: &str) -> Response {
    let (status, message) = match e {
        DomainError::NotFound => (StatusCode::NOT_FOUND, format!("{} not found", entity)),
        DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        DomainError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        DomainError::Database(msg) | DomainError::Internal(msg) => {
            tracing::error!("{} repository error: {}", entity, msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            )
        }
    };
    (status, Json(json!({ "error": message }))).into_response()
}

pub fn not_found(entity: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{} not found", entity) })),
    )
        .into_response()
}
