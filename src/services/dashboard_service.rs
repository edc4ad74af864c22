//! Dashboard Service - headline numbers for the landing page

use sea_orm::*;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{ServiceError, checkout_service, maintenance_service, reservation_service};
use crate::models::asset::{self, Entity as Asset};
use crate::models::inventory_item::{self, Entity as InventoryItem};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_assets: u64,
    pub assets_by_status: BTreeMap<String, u64>,
    pub active_checkouts: u64,
    pub overdue_checkouts: u64,
    pub open_maintenance: u64,
    pub pending_reservations: u64,
    pub inventory_items: u64,
    pub low_stock_items: u64,
    pub inventory_value: f64,
}

pub async fn dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats, ServiceError> {
    let assets = Asset::find()
        .filter(asset::Column::IsDeleted.eq(false))
        .all(db)
        .await?;

    let mut assets_by_status: BTreeMap<String, u64> = asset::STATUSES
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    for a in &assets {
        *assets_by_status.entry(a.status.clone()).or_insert(0) += 1;
    }

    let items = InventoryItem::find()
        .filter(inventory_item::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let low_stock_items = items.iter().filter(|i| i.is_low_stock()).count() as u64;
    let inventory_value = round_money(items.iter().map(|i| i.stock_value()).sum());

    Ok(DashboardStats {
        total_assets: assets.len() as u64,
        assets_by_status,
        active_checkouts: checkout_service::count_active_checkouts(db).await?,
        overdue_checkouts: checkout_service::count_overdue_checkouts(db).await?,
        open_maintenance: maintenance_service::count_open_maintenance(db).await?,
        pending_reservations: reservation_service::count_pending_reservations(db).await?,
        inventory_items: items.len() as u64,
        low_stock_items,
        inventory_value,
    })
}

pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
