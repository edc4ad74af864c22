//! Spreadsheet (CSV) imports

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::modules::import::{self, RowError};
use crate::services::activity;

/// Pull the `file` field out of a multipart upload
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Malformed multipart upload: {}", e) })),
                )
                    .into_response());
            }
        };
        if field.name() == Some("file") {
            return field.bytes().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Failed to read upload: {}", e) })),
                )
                    .into_response()
            });
        }
    }
    Err((
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No file uploaded" })),
    )
        .into_response())
}

fn summary(imported: usize, mut errors: Vec<RowError>) -> Response {
    errors.sort_by_key(|e| e.row);
    (
        StatusCode::OK,
        Json(json!({
            "imported": imported,
            "skipped": errors.len(),
            "errors": errors
        })),
    )
        .into_response()
}

pub async fn import_assets(
    State(state): State<AppState>,
    claims: Claims,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let data = match read_file_field(&mut multipart).await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let parsed = match import::parse_assets_csv(&data) {
        Ok(parsed) => parsed,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response();
        }
    };

    let mut imported = 0;
    let mut errors = parsed.errors;
    for (row, input) in parsed.rows {
        match state.asset_repo.create(input).await {
            Ok(asset) => {
                imported += 1;
                activity::record(
                    state.db(),
                    "asset",
                    asset.id,
                    "import",
                    Some(json!({ "asset_tag": asset.asset_tag, "row": row })),
                    Some(claims.username()),
                )
                .await;
            }
            Err(e) => errors.push(RowError {
                row,
                message: e.to_string(),
            }),
        }
    }

    tracing::info!("Asset import: {} imported, {} skipped", imported, errors.len());
    summary(imported, errors)
}

pub async fn import_inventory(
    State(state): State<AppState>,
    claims: Claims,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let data = match read_file_field(&mut multipart).await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let parsed = match import::parse_inventory_csv(&data) {
        Ok(parsed) => parsed,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response();
        }
    };

    let performed_by = claims.username().to_string();
    let mut imported = 0;
    let mut errors = parsed.errors;
    for (row, input) in parsed.rows {
        match state
            .inventory_repo
            .create(input, Some(performed_by.clone()))
            .await
        {
            Ok(item) => {
                imported += 1;
                activity::record(
                    state.db(),
                    "inventory_item",
                    item.id,
                    "import",
                    Some(json!({ "sku": item.sku, "row": row })),
                    Some(&performed_by),
                )
                .await;
            }
            Err(e) => errors.push(RowError {
                row,
                message: e.to_string(),
            }),
        }
    }

    tracing::info!("Inventory import: {} imported, {} skipped", imported, errors.len());
    summary(imported, errors)
}
