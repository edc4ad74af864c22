//! Spreadsheet (CSV) exports and the JSON backup

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::domain_error;
use crate::domain::{AssetFilter, InventoryFilter};
use crate::infrastructure::AppState;
use crate::models::{
    asset, audit, checkout, employee, inventory_item, inventory_transaction, maintenance, report,
    reservation,
};
use crate::modules::export::{self, ASSET_COLUMNS, INVENTORY_COLUMNS};

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub columns: Option<String>,
}

fn attachment(content_type: &'static str, filename: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(v) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename)) {
        headers.insert(header::CONTENT_DISPOSITION, v);
    }
    headers
}

fn csv_response(result: Result<Vec<u8>, String>, name: &str) -> Response {
    match result {
        Ok(bytes) => {
            let filename = format!("{}_{}.csv", name, chrono::Utc::now().format("%Y-%m-%d"));
            (
                StatusCode::OK,
                attachment("text/csv; charset=utf-8", &filename),
                bytes,
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to write CSV: {}", e) })),
        )
            .into_response(),
    }
}

fn bad_columns(e: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response()
}

pub async fn export_assets(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let columns = match export::select_columns(ASSET_COLUMNS, query.columns.as_deref()) {
        Ok(columns) => columns,
        Err(e) => return bad_columns(e),
    };

    match state.asset_repo.find_all(AssetFilter::default()).await {
        Ok(result) => csv_response(export::assets_csv(&result.assets, &columns), "assets"),
        Err(e) => domain_error(e, "Asset"),
    }
}

pub async fn export_inventory(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let columns = match export::select_columns(INVENTORY_COLUMNS, query.columns.as_deref()) {
        Ok(columns) => columns,
        Err(e) => return bad_columns(e),
    };

    match state.inventory_repo.find_all(InventoryFilter::default()).await {
        Ok(items) => csv_response(export::inventory_csv(&items, &columns), "inventory"),
        Err(e) => domain_error(e, "Inventory item"),
    }
}

/// Every table, soft-deleted rows included. User accounts are left out.
#[derive(Serialize)]
pub struct BackupData {
    pub version: String,
    pub timestamp: String,
    pub employees: Vec<employee::Model>,
    pub assets: Vec<asset::Model>,
    pub checkouts: Vec<checkout::Model>,
    pub audits: Vec<audit::Model>,
    pub maintenance: Vec<maintenance::Model>,
    pub reservations: Vec<reservation::Model>,
    pub inventory_items: Vec<inventory_item::Model>,
    pub inventory_transactions: Vec<inventory_transaction::Model>,
    pub reports: Vec<report::Model>,
}

async fn collect_backup(db: &DatabaseConnection) -> Result<BackupData, DbErr> {
    Ok(BackupData {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        employees: employee::Entity::find().all(db).await?,
        assets: asset::Entity::find().all(db).await?,
        checkouts: checkout::Entity::find().all(db).await?,
        audits: audit::Entity::find().all(db).await?,
        maintenance: maintenance::Entity::find().all(db).await?,
        reservations: reservation::Entity::find().all(db).await?,
        inventory_items: inventory_item::Entity::find().all(db).await?,
        inventory_transactions: inventory_transaction::Entity::find().all(db).await?,
        reports: report::Entity::find().all(db).await?,
    })
}

pub async fn export_backup(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match collect_backup(&db).await {
        Ok(backup) => {
            let filename = format!(
                "assetdesk_backup_{}.json",
                chrono::Utc::now().format("%Y-%m-%d")
            );
            (
                StatusCode::OK,
                attachment("application/json", &filename),
                Json(backup),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
