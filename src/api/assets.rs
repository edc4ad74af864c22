//! Asset API handlers using repository pattern

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use super::error::{domain_error, not_found};
use crate::domain::{AssetFilter, CreateAssetInput, DomainError, UpdateAssetInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::modules::record_sheet;
use crate::services::{activity, history_service};

#[utoipa::path(
    get,
    path = "/api/assets",
    params(
        ("q" = Option<String>, Query, description = "Search tag, name, serial number or model"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("location" = Option<String>, Query, description = "Filter by location"),
        ("sort" = Option<String>, Query, description = "name_asc, name_desc, recent or tag"),
        ("page" = Option<u64>, Query, description = "Zero-based page"),
        ("limit" = Option<u64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "List assets")
    )
)]
pub async fn list_assets(
    State(state): State<AppState>,
    Query(filter): Query<AssetFilter>,
) -> impl IntoResponse {
    match state.asset_repo.find_all(filter).await {
        Ok(result) => Json(json!({
            "assets": result.assets,
            "total": result.total
        }))
        .into_response(),
        Err(e) => domain_error(e, "Asset"),
    }
}

pub async fn get_asset(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match state.asset_repo.find_by_id(id).await {
        Ok(Some(asset)) => Json(json!({ "asset": asset })).into_response(),
        Ok(None) => not_found("Asset"),
        Err(e) => domain_error(e, "Asset"),
    }
}

#[utoipa::path(
    post,
    path = "/api/assets",
    responses(
        (status = 201, description = "Asset created"),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Asset tag already in use")
    )
)]
pub async fn create_asset(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateAssetInput>,
) -> impl IntoResponse {
    match state.asset_repo.create(payload).await {
        Ok(asset) => {
            activity::record(
                state.db(),
                "asset",
                asset.id,
                "create",
                Some(json!(asset)),
                Some(claims.username()),
            )
            .await;
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Asset created successfully",
                    "asset": asset
                })),
            )
                .into_response()
        }
        Err(e) => domain_error(e, "Asset"),
    }
}

#[utoipa::path(
    put,
    path = "/api/assets/{id}",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset updated"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Tag clash or asset checked out")
    )
)]
pub async fn update_asset(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAssetInput>,
) -> impl IntoResponse {
    match state.asset_repo.update(id, payload).await {
        Ok(asset) => {
            activity::record(
                state.db(),
                "asset",
                id,
                "update",
                Some(json!(asset)),
                Some(claims.username()),
            )
            .await;
            Json(json!({
                "message": "Asset updated successfully",
                "asset": asset
            }))
            .into_response()
        }
        Err(e) => domain_error(e, "Asset"),
    }
}

#[utoipa::path(
    delete,
    path = "/api/assets/{id}",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset deleted"),
        (status = 409, description = "Asset has an active checkout")
    )
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.asset_repo.delete(id).await {
        Ok(()) => {
            activity::record(state.db(), "asset", id, "delete", None, Some(claims.username())).await;
            Json(json!({ "message": "Asset deleted successfully" })).into_response()
        }
        // Deleting something already gone is not an error
        Err(DomainError::NotFound) => {
            Json(json!({ "message": "Asset deleted successfully" })).into_response()
        }
        Err(e) => domain_error(e, "Asset"),
    }
}

pub async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    match state.asset_repo.categories().await {
        Ok(categories) => Json(json!({ "categories": categories })).into_response(),
        Err(e) => domain_error(e, "Asset"),
    }
}

pub async fn get_asset_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let asset = match state.asset_repo.find_by_id(id).await {
        Ok(Some(asset)) => asset,
        Ok(None) => return not_found("Asset"),
        Err(e) => return domain_error(e, "Asset"),
    };

    match history_service::asset_history(state.db(), id).await {
        Ok(history) => Json(json!({
            "asset": asset,
            "history": history
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Keep only characters that are safe inside a quoted header filename
fn sheet_filename(tag: &str) -> String {
    let safe: String = tag
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("asset-{}.html", safe)
}

/// Printable HTML record sheet, served inline
pub async fn get_asset_sheet(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let asset = match state.asset_repo.find_by_id(id).await {
        Ok(Some(asset)) => asset,
        Ok(None) => return not_found("Asset"),
        Err(e) => return domain_error(e, "Asset"),
    };

    let history = match history_service::asset_history(state.db(), id).await {
        Ok(history) => history,
        Err(e) => return e.into_response(),
    };

    let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let html = record_sheet::render_asset_sheet(&asset, &history, &generated_at);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("inline; filename=\"{}\"", sheet_filename(&asset.asset_tag)))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    (StatusCode::OK, headers, html).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_filename_is_header_safe() {
        assert_eq!(sheet_filename("LT-001"), "asset-LT-001.html");
        assert_eq!(sheet_filename("a\"b/c d"), "asset-a_b_c_d.html");
    }
}
