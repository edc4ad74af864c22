//! Reservation Service - booking assets for future date ranges

use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use super::{ServiceError, activity};
use crate::models::asset::{self, Entity as Asset};
use crate::models::employee::Entity as Employee;
use crate::models::reservation::{self, Entity as Reservation, ReservationDto};
use crate::utils::{dates, non_blank};

/// Filter parameters for listing reservations
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReservationFilter {
    pub asset_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub status: Option<String>,
}

pub async fn list_reservations(
    db: &DatabaseConnection,
    filter: ReservationFilter,
) -> Result<Vec<reservation::Model>, ServiceError> {
    let mut query = Reservation::find();

    if let Some(asset_id) = filter.asset_id {
        query = query.filter(reservation::Column::AssetId.eq(asset_id));
    }
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(reservation::Column::EmployeeId.eq(employee_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(reservation::Column::Status.eq(status));
    }

    Ok(query
        .order_by_asc(reservation::Column::StartDate)
        .all(db)
        .await?)
}

/// Create a pending reservation. Date ranges are inclusive and may not
/// overlap another pending or approved reservation of the same asset.
pub async fn create_reservation(
    db: &DatabaseConnection,
    dto: ReservationDto,
    performed_by: Option<&str>,
) -> Result<reservation::Model, ServiceError> {
    let start = dates::parse_date("start_date", &dto.start_date).map_err(ServiceError::Validation)?;
    let end = dates::parse_date("end_date", &dto.end_date).map_err(ServiceError::Validation)?;
    if end < start {
        return Err(ServiceError::Validation(
            "end_date cannot be before start_date".to_string(),
        ));
    }

    let asset = Asset::find_by_id(dto.asset_id)
        .filter(asset::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Asset".to_string()))?;

    if asset.status == asset::STATUS_RETIRED {
        return Err(ServiceError::Conflict(
            "Retired assets cannot be reserved".to_string(),
        ));
    }

    let employee = Employee::find_by_id(dto.employee_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Employee".to_string()))?;

    if !employee.is_active {
        return Err(ServiceError::InvalidState(format!(
            "Employee {} is inactive",
            employee.name
        )));
    }

    let holding = Reservation::find()
        .filter(reservation::Column::AssetId.eq(asset.id))
        .filter(reservation::Column::Status.is_in(reservation::HOLDING_STATUSES))
        .all(db)
        .await?;

    for existing in &holding {
        let (Ok(other_start), Ok(other_end)) = (
            dates::parse_date("start_date", &existing.start_date),
            dates::parse_date("end_date", &existing.end_date),
        ) else {
            continue;
        };
        if dates::ranges_overlap(start, end, other_start, other_end) {
            return Err(ServiceError::Conflict(format!(
                "Asset already reserved from {} to {}",
                existing.start_date, existing.end_date
            )));
        }
    }

    let now = dates::now_rfc3339();
    let saved = reservation::ActiveModel {
        asset_id: Set(asset.id),
        employee_id: Set(employee.id),
        start_date: Set(start.format(dates::DATE_FORMAT).to_string()),
        end_date: Set(end.format(dates::DATE_FORMAT).to_string()),
        purpose: Set(non_blank(dto.purpose)),
        status: Set(reservation::STATUS_PENDING.to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    activity::record(
        db,
        "reservation",
        saved.id,
        "create",
        Some(json!({ "asset_id": saved.asset_id, "start": saved.start_date, "end": saved.end_date })),
        performed_by,
    )
    .await;

    Ok(saved)
}

/// Approve a pending reservation. An available asset whose reservation
/// window has started is held as `reserved`.
pub async fn approve_reservation(
    db: &DatabaseConnection,
    id: i32,
    performed_by: Option<&str>,
) -> Result<reservation::Model, ServiceError> {
    let now = dates::now_rfc3339();
    let today = dates::today();
    let txn = db.begin().await?;

    let existing = Reservation::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Reservation".to_string()))?;

    if existing.status != reservation::STATUS_PENDING {
        return Err(ServiceError::InvalidState(format!(
            "Only pending reservations can be approved (status is {})",
            existing.status
        )));
    }

    let covers_today = existing.start_date <= today && today <= existing.end_date;
    let asset_id = existing.asset_id;

    let mut active: reservation::ActiveModel = existing.into();
    active.status = Set(reservation::STATUS_APPROVED.to_owned());
    active.updated_at = Set(now.clone());
    let updated = active.update(&txn).await?;

    if covers_today
        && let Some(asset) = Asset::find_by_id(asset_id).one(&txn).await?
        && asset.status == asset::STATUS_AVAILABLE
    {
        let mut asset_active: asset::ActiveModel = asset.into();
        asset_active.status = Set(asset::STATUS_RESERVED.to_owned());
        asset_active.updated_at = Set(now);
        asset_active.update(&txn).await?;
    }

    txn.commit().await?;

    activity::record(db, "reservation", updated.id, "approve", None, performed_by).await;
    Ok(updated)
}

/// Cancel a pending or approved reservation, releasing a held asset
/// unless another approved reservation still covers today.
pub async fn cancel_reservation(
    db: &DatabaseConnection,
    id: i32,
    performed_by: Option<&str>,
) -> Result<reservation::Model, ServiceError> {
    let now = dates::now_rfc3339();
    let today = dates::today();
    let txn = db.begin().await?;

    let existing = Reservation::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Reservation".to_string()))?;

    if !reservation::HOLDING_STATUSES.contains(&existing.status.as_str()) {
        return Err(ServiceError::InvalidState(format!(
            "Reservation is already {}",
            existing.status
        )));
    }

    let asset_id = existing.asset_id;
    let mut active: reservation::ActiveModel = existing.into();
    active.status = Set(reservation::STATUS_CANCELLED.to_owned());
    active.updated_at = Set(now.clone());
    let updated = active.update(&txn).await?;

    let still_held = Reservation::find()
        .filter(reservation::Column::AssetId.eq(asset_id))
        .filter(reservation::Column::Status.eq(reservation::STATUS_APPROVED))
        .filter(reservation::Column::StartDate.lte(today.clone()))
        .filter(reservation::Column::EndDate.gte(today))
        .count(&txn)
        .await?
        > 0;

    if !still_held
        && let Some(asset) = Asset::find_by_id(asset_id).one(&txn).await?
        && asset.status == asset::STATUS_RESERVED
    {
        let mut asset_active: asset::ActiveModel = asset.into();
        asset_active.status = Set(asset::STATUS_AVAILABLE.to_owned());
        asset_active.updated_at = Set(now);
        asset_active.update(&txn).await?;
    }

    txn.commit().await?;

    activity::record(db, "reservation", updated.id, "cancel", None, performed_by).await;
    Ok(updated)
}

pub async fn count_pending_reservations(db: &DatabaseConnection) -> Result<u64, ServiceError> {
    Ok(Reservation::find()
        .filter(reservation::Column::Status.eq(reservation::STATUS_PENDING))
        .count(db)
        .await?)
}
