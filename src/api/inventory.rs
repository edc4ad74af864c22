//! Inventory item and stock transaction handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::error::{domain_error, not_found};
use crate::domain::{
    CreateInventoryItemInput, DomainError, InventoryFilter, UpdateInventoryItemInput,
};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::models::inventory_transaction::TransactionDto;
use crate::services::{activity, inventory_service};

pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<InventoryFilter>,
) -> impl IntoResponse {
    match state.inventory_repo.find_all(filter).await {
        Ok(items) => Json(json!({
            "total": items.len(),
            "items": items
        }))
        .into_response(),
        Err(e) => domain_error(e, "Inventory item"),
    }
}

pub async fn get_item(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match state.inventory_repo.find_by_id(id).await {
        Ok(Some(item)) => Json(json!({ "item": item })).into_response(),
        Ok(None) => not_found("Inventory item"),
        Err(e) => domain_error(e, "Inventory item"),
    }
}

pub async fn create_item(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateInventoryItemInput>,
) -> impl IntoResponse {
    let performed_by = claims.username().to_string();
    match state
        .inventory_repo
        .create(payload, Some(performed_by.clone()))
        .await
    {
        Ok(item) => {
            activity::record(
                state.db(),
                "inventory_item",
                item.id,
                "create",
                Some(json!(item)),
                Some(&performed_by),
            )
            .await;
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Inventory item created",
                    "item": item
                })),
            )
                .into_response()
        }
        Err(e) => domain_error(e, "Inventory item"),
    }
}

pub async fn update_item(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateInventoryItemInput>,
) -> impl IntoResponse {
    match state.inventory_repo.update(id, payload).await {
        Ok(item) => {
            activity::record(
                state.db(),
                "inventory_item",
                id,
                "update",
                Some(json!(item)),
                Some(claims.username()),
            )
            .await;
            Json(json!({
                "message": "Inventory item updated",
                "item": item
            }))
            .into_response()
        }
        Err(e) => domain_error(e, "Inventory item"),
    }
}

pub async fn delete_item(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.inventory_repo.delete(id).await {
        Ok(()) => {
            activity::record(
                state.db(),
                "inventory_item",
                id,
                "delete",
                None,
                Some(claims.username()),
            )
            .await;
            Json(json!({ "message": "Inventory item deleted" })).into_response()
        }
        Err(DomainError::NotFound) => {
            Json(json!({ "message": "Inventory item deleted" })).into_response()
        }
        Err(e) => domain_error(e, "Inventory item"),
    }
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match inventory_service::list_transactions(state.db(), id).await {
        Ok(transactions) => Json(json!({
            "total": transactions.len(),
            "transactions": transactions
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<TransactionDto>,
) -> impl IntoResponse {
    match inventory_service::record_transaction(state.db(), id, payload, Some(claims.username()))
        .await
    {
        Ok((item, transaction)) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Stock movement recorded",
                "transaction": transaction,
                "item": crate::domain::InventoryItem::from(item)
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
