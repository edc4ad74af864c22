use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::services::activity::{self, ActivityFilter};

pub async fn list_activity(
    State(db): State<DatabaseConnection>,
    Query(filter): Query<ActivityFilter>,
) -> impl IntoResponse {
    match activity::list_activity(&db, filter).await {
        Ok(entries) => Json(json!({
            "total": entries.len(),
            "activity": entries
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
