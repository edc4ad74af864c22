//! Per-asset history: everything that happened to one asset

use sea_orm::*;
use serde::Serialize;

use super::ServiceError;
use super::audit_service::{self, AuditFilter};
use super::checkout_service::{self, CheckoutFilter, CheckoutWithDetails};
use super::maintenance_service::{self, MaintenanceFilter};
use super::reservation_service::{self, ReservationFilter};
use crate::models::{audit, checkout, maintenance, reservation};

#[derive(Debug, Serialize)]
pub struct AssetHistory {
    pub checkouts: Vec<CheckoutWithDetails>,
    pub maintenance: Vec<maintenance::Model>,
    pub audits: Vec<audit::Model>,
    pub reservations: Vec<reservation::Model>,
}

impl AssetHistory {
    /// The open checkout, if the asset is currently assigned
    pub fn current_checkout(&self) -> Option<&CheckoutWithDetails> {
        self.checkouts.iter().find(|c| c.status == checkout::STATUS_ACTIVE)
    }

    pub fn last_audit(&self) -> Option<&audit::Model> {
        self.audits.first()
    }
}

pub async fn asset_history(
    db: &DatabaseConnection,
    asset_id: i32,
) -> Result<AssetHistory, ServiceError> {
    let checkouts = checkout_service::list_checkouts(
        db,
        CheckoutFilter {
            asset_id: Some(asset_id),
            ..Default::default()
        },
    )
    .await?;

    let maintenance = maintenance_service::list_maintenance(
        db,
        MaintenanceFilter {
            asset_id: Some(asset_id),
            ..Default::default()
        },
    )
    .await?;

    let audits = audit_service::list_audits(
        db,
        AuditFilter {
            asset_id: Some(asset_id),
            ..Default::default()
        },
    )
    .await?;

    let mut reservations = reservation_service::list_reservations(
        db,
        ReservationFilter {
            asset_id: Some(asset_id),
            ..Default::default()
        },
    )
    .await?;
    reservations.reverse();

    Ok(AssetHistory {
        checkouts,
        maintenance,
        audits,
        reservations,
    })
}
