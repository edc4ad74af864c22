use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::infrastructure::auth::Claims;
use crate::models::reservation::ReservationDto;
use crate::services::reservation_service::{self, ReservationFilter};

pub async fn list_reservations(
    State(db): State<DatabaseConnection>,
    Query(filter): Query<ReservationFilter>,
) -> impl IntoResponse {
    match reservation_service::list_reservations(&db, filter).await {
        Ok(reservations) => Json(json!({
            "total": reservations.len(),
            "reservations": reservations
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_reservation(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<ReservationDto>,
) -> impl IntoResponse {
    match reservation_service::create_reservation(&db, payload, Some(claims.username())).await {
        Ok(reservation) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Reservation created",
                "reservation": reservation
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn approve_reservation(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match reservation_service::approve_reservation(&db, id, Some(claims.username())).await {
        Ok(reservation) => Json(json!({
            "message": "Reservation approved",
            "reservation": reservation
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn cancel_reservation(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match reservation_service::cancel_reservation(&db, id, Some(claims.username())).await {
        Ok(reservation) => Json(json!({
            "message": "Reservation cancelled",
            "reservation": reservation
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
