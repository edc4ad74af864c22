pub mod activity;
pub mod assets;
pub mod audits;
pub mod auth;
pub mod checkouts;
pub mod dashboard;
pub mod data;
pub mod employees;
pub mod error;
pub mod export;
pub mod health;
pub mod inventory;
pub mod maintenance;
pub mod reports;
pub mod reservations;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        // Dashboard
        .route("/dashboard", get(dashboard::get_dashboard))
        // Employees
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/employees/:id",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        // Assets
        .route("/assets", get(assets::list_assets).post(assets::create_asset))
        .route("/assets/categories", get(assets::list_categories))
        .route(
            "/assets/:id",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/assets/:id/history", get(assets::get_asset_history))
        .route("/assets/:id/sheet", get(assets::get_asset_sheet))
        // Checkouts
        .route(
            "/checkouts",
            get(checkouts::list_checkouts).post(checkouts::create_checkout),
        )
        .route("/checkouts/:id/return", put(checkouts::return_checkout))
        // Audits
        .route("/audits", get(audits::list_audits).post(audits::create_audit))
        .route("/audits/summary", get(audits::audit_summary))
        .route("/audits/:id", axum::routing::delete(audits::delete_audit))
        // Maintenance
        .route(
            "/maintenance",
            get(maintenance::list_maintenance).post(maintenance::schedule_maintenance),
        )
        .route(
            "/maintenance/:id",
            get(maintenance::get_maintenance).put(maintenance::update_maintenance),
        )
        .route("/maintenance/:id/start", put(maintenance::start_maintenance))
        .route(
            "/maintenance/:id/complete",
            put(maintenance::complete_maintenance),
        )
        .route("/maintenance/:id/cancel", put(maintenance::cancel_maintenance))
        // Reservations
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservations/:id/approve",
            put(reservations::approve_reservation),
        )
        .route(
            "/reservations/:id/cancel",
            put(reservations::cancel_reservation),
        )
        // Inventory
        .route("/inventory", get(inventory::list_items).post(inventory::create_item))
        .route(
            "/inventory/:id",
            get(inventory::get_item)
                .put(inventory::update_item)
                .delete(inventory::delete_item),
        )
        .route(
            "/inventory/:id/transactions",
            get(inventory::list_transactions).post(inventory::create_transaction),
        )
        // Reports
        .route("/reports", get(reports::list_reports).post(reports::create_report))
        .route(
            "/reports/generate/:report_type",
            get(reports::generate_report),
        )
        .route("/reports/:id", axum::routing::delete(reports::delete_report))
        .route("/reports/:id/run", get(reports::run_report))
        // Spreadsheet import/export
        .route("/export", get(export::export_backup))
        .route("/export/assets", get(export::export_assets))
        .route("/export/inventory", get(export::export_inventory))
        .route("/import/assets", post(data::import_assets))
        .route("/import/inventory", post(data::import_inventory))
        // Activity log
        .route("/activity", get(activity::list_activity))
        .with_state(state)
}
