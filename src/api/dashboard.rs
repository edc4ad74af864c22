use axum::{Json, extract::State, response::IntoResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::services::dashboard_service;

pub async fn get_dashboard(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match dashboard_service::dashboard_stats(&db).await {
        Ok(stats) => Json(json!(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}
