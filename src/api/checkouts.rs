use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::infrastructure::auth::Claims;
use crate::models::checkout::{CheckoutDto, ReturnDto};
use crate::services::checkout_service::{self, CheckoutFilter};

#[utoipa::path(
    get,
    path = "/api/checkouts",
    params(
        ("status" = Option<String>, Query, description = "active or returned"),
        ("employee_id" = Option<i32>, Query, description = "Filter by employee"),
        ("asset_id" = Option<i32>, Query, description = "Filter by asset"),
        ("overdue" = Option<bool>, Query, description = "Only active checkouts past their due date")
    ),
    responses(
        (status = 200, description = "List checkouts")
    )
)]
pub async fn list_checkouts(
    State(db): State<DatabaseConnection>,
    Query(filter): Query<CheckoutFilter>,
) -> impl IntoResponse {
    match checkout_service::list_checkouts(&db, filter).await {
        Ok(checkouts) => Json(json!({
            "total": checkouts.len(),
            "checkouts": checkouts
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/checkouts",
    responses(
        (status = 201, description = "Asset checked out"),
        (status = 404, description = "Asset or employee not found"),
        (status = 409, description = "Asset not available")
    )
)]
pub async fn create_checkout(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<CheckoutDto>,
) -> impl IntoResponse {
    match checkout_service::create_checkout(&db, payload, Some(claims.username())).await {
        Ok(checkout) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Asset checked out",
                "checkout": checkout
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/checkouts/{id}/return",
    params(("id" = i32, Path, description = "Checkout ID")),
    responses(
        (status = 200, description = "Asset returned"),
        (status = 404, description = "Checkout not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_checkout(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    payload: Option<Json<ReturnDto>>,
) -> impl IntoResponse {
    let dto = payload.map(|Json(dto)| dto).unwrap_or_default();
    match checkout_service::return_checkout(&db, id, dto, Some(claims.username())).await {
        Ok(checkout) => Json(json!({
            "message": "Asset returned",
            "checkout": checkout
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
