//! Checkout Service - assigning assets to employees and taking them back

use chrono::NaiveDate;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use super::{ServiceError, activity};
use crate::models::asset::{self, Entity as Asset};
use crate::models::audit;
use crate::models::checkout::{self, CheckoutDto, Entity as Checkout, ReturnDto};
use crate::models::employee::{self, Entity as Employee};
use crate::models::reservation::{self, Entity as Reservation};
use crate::utils::{dates, non_blank};

/// Enriched checkout with related data
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutWithDetails {
    pub id: i32,
    pub asset_id: i32,
    pub employee_id: i32,
    pub checkout_date: String,
    pub due_date: Option<String>,
    pub return_date: Option<String>,
    pub status: String,
    pub checkout_notes: Option<String>,
    pub return_notes: Option<String>,
    pub return_condition: Option<String>,
    pub asset_tag: String,
    pub asset_name: String,
    pub employee_name: String,
    pub is_overdue: bool,
}

/// Filter parameters for listing checkouts
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CheckoutFilter {
    pub status: Option<String>,
    pub employee_id: Option<i32>,
    pub asset_id: Option<i32>,
    pub overdue: Option<bool>,
}

/// List checkouts with asset and employee names
pub async fn list_checkouts(
    db: &DatabaseConnection,
    filter: CheckoutFilter,
) -> Result<Vec<CheckoutWithDetails>, ServiceError> {
    let mut condition = Condition::all();

    if let Some(status) = filter.status {
        condition = condition.add(checkout::Column::Status.eq(status));
    }
    if let Some(employee_id) = filter.employee_id {
        condition = condition.add(checkout::Column::EmployeeId.eq(employee_id));
    }
    if let Some(asset_id) = filter.asset_id {
        condition = condition.add(checkout::Column::AssetId.eq(asset_id));
    }

    let today = chrono::Utc::now().date_naive();
    if filter.overdue == Some(true) {
        condition = condition
            .add(checkout::Column::Status.eq(checkout::STATUS_ACTIVE))
            .add(checkout::Column::DueDate.is_not_null())
            .add(checkout::Column::DueDate.lt(today.format(dates::DATE_FORMAT).to_string()));
    }

    let checkouts_with_employees = Checkout::find()
        .filter(condition)
        .order_by_desc(checkout::Column::CheckoutDate)
        .order_by_desc(checkout::Column::Id)
        .find_also_related(Employee)
        .all(db)
        .await?;

    let asset_ids: Vec<i32> = checkouts_with_employees
        .iter()
        .map(|(c, _)| c.asset_id)
        .collect();

    let mut asset_map: HashMap<i32, asset::Model> = HashMap::new();
    if !asset_ids.is_empty() {
        for a in Asset::find()
            .filter(asset::Column::Id.is_in(asset_ids))
            .all(db)
            .await?
        {
            asset_map.insert(a.id, a);
        }
    }

    Ok(checkouts_with_employees
        .into_iter()
        .map(|(c, employee)| {
            let asset = asset_map.get(&c.asset_id);
            with_details(c, asset, employee.as_ref(), today)
        })
        .collect())
}

fn with_details(
    c: checkout::Model,
    asset: Option<&asset::Model>,
    employee: Option<&employee::Model>,
    today: NaiveDate,
) -> CheckoutWithDetails {
    let is_overdue =
        c.status == checkout::STATUS_ACTIVE && dates::is_overdue(c.due_date.as_deref(), today);
    CheckoutWithDetails {
        id: c.id,
        asset_id: c.asset_id,
        employee_id: c.employee_id,
        checkout_date: c.checkout_date,
        due_date: c.due_date,
        return_date: c.return_date,
        status: c.status,
        checkout_notes: c.checkout_notes,
        return_notes: c.return_notes,
        return_condition: c.return_condition,
        asset_tag: asset
            .map(|a| a.asset_tag.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        asset_name: asset
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        employee_name: employee
            .map(|e| e.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        is_overdue,
    }
}

/// The open checkout of an asset, if any
pub async fn active_checkout_for_asset<C: ConnectionTrait>(
    db: &C,
    asset_id: i32,
) -> Result<Option<checkout::Model>, ServiceError> {
    Ok(Checkout::find()
        .filter(checkout::Column::AssetId.eq(asset_id))
        .filter(checkout::Column::Status.eq(checkout::STATUS_ACTIVE))
        .one(db)
        .await?)
}

/// Check an asset out to an employee
pub async fn create_checkout(
    db: &DatabaseConnection,
    dto: CheckoutDto,
    performed_by: Option<&str>,
) -> Result<checkout::Model, ServiceError> {
    let now = dates::now_rfc3339();

    let checkout_date = match non_blank(dto.checkout_date) {
        Some(d) => dates::parse_date("checkout_date", &d).map_err(ServiceError::Validation)?,
        None => chrono::Utc::now().date_naive(),
    };
    let due_date = match non_blank(dto.due_date) {
        Some(d) => {
            let due = dates::parse_date("due_date", &d).map_err(ServiceError::Validation)?;
            if due < checkout_date {
                return Err(ServiceError::Validation(
                    "due_date cannot be before checkout_date".to_string(),
                ));
            }
            Some(due.format(dates::DATE_FORMAT).to_string())
        }
        None => None,
    };
    let checkout_date = checkout_date.format(dates::DATE_FORMAT).to_string();

    let txn = db.begin().await?;

    // 1. Asset must exist and be free
    let asset = Asset::find_by_id(dto.asset_id)
        .filter(asset::Column::IsDeleted.eq(false))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Asset".to_string()))?;

    let employee = Employee::find_by_id(dto.employee_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Employee".to_string()))?;

    if !employee.is_active {
        return Err(ServiceError::InvalidState(format!(
            "Employee {} is inactive",
            employee.name
        )));
    }

    if asset.status != asset::STATUS_AVAILABLE && asset.status != asset::STATUS_RESERVED {
        return Err(ServiceError::Conflict(format!(
            "Asset is currently {}",
            asset.status
        )));
    }

    // 2. Approved reservations covering the checkout date decide who may take it
    let covering = Reservation::find()
        .filter(reservation::Column::AssetId.eq(asset.id))
        .filter(reservation::Column::Status.eq(reservation::STATUS_APPROVED))
        .filter(reservation::Column::StartDate.lte(checkout_date.clone()))
        .filter(reservation::Column::EndDate.gte(checkout_date.clone()))
        .all(&txn)
        .await?;

    if covering.iter().any(|r| r.employee_id != employee.id) {
        return Err(ServiceError::Conflict(
            "Asset is reserved for another employee".to_string(),
        ));
    }

    let own_reservation = covering.into_iter().find(|r| r.employee_id == employee.id);
    if asset.status == asset::STATUS_RESERVED && own_reservation.is_none() {
        return Err(ServiceError::Conflict(
            "Asset is reserved and has no approved reservation for this employee".to_string(),
        ));
    }

    if let Some(reservation) = own_reservation {
        let mut active: reservation::ActiveModel = reservation.into();
        active.status = Set(reservation::STATUS_FULFILLED.to_owned());
        active.updated_at = Set(now.clone());
        active.update(&txn).await?;
    }

    // 3. Create Checkout
    let new_checkout = checkout::ActiveModel {
        asset_id: Set(asset.id),
        employee_id: Set(employee.id),
        checkout_date: Set(checkout_date),
        due_date: Set(due_date),
        return_date: Set(None),
        status: Set(checkout::STATUS_ACTIVE.to_owned()),
        checkout_notes: Set(non_blank(dto.notes)),
        return_notes: Set(None),
        return_condition: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    let saved = new_checkout.insert(&txn).await?;

    // 4. Update Asset status to 'checked_out'
    let mut asset_active: asset::ActiveModel = asset.into();
    asset_active.status = Set(asset::STATUS_CHECKED_OUT.to_owned());
    asset_active.updated_at = Set(now);
    asset_active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        "Asset #{} checked out to employee #{}",
        saved.asset_id,
        saved.employee_id
    );
    activity::record(
        db,
        "checkout",
        saved.id,
        "checkout",
        Some(json!({ "asset_id": saved.asset_id, "employee_id": saved.employee_id })),
        performed_by,
    )
    .await;

    Ok(saved)
}

/// Check an asset back in
pub async fn return_checkout(
    db: &DatabaseConnection,
    id: i32,
    dto: ReturnDto,
    performed_by: Option<&str>,
) -> Result<checkout::Model, ServiceError> {
    let now = dates::now_rfc3339();

    let return_condition = non_blank(dto.return_condition);
    if let Some(condition) = &return_condition
        && (!audit::is_valid_condition(condition) || condition == "missing")
    {
        return Err(ServiceError::Validation(format!(
            "Invalid return_condition '{}'",
            condition
        )));
    }

    let txn = db.begin().await?;

    // 1. Find Checkout
    let existing = Checkout::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Checkout".to_string()))?;

    if existing.status == checkout::STATUS_RETURNED {
        return Err(ServiceError::Conflict(
            "Checkout is already returned".to_string(),
        ));
    }

    // 2. Update Checkout
    let damaged = return_condition.as_deref() == Some(checkout::CONDITION_DAMAGED);
    let asset_id = existing.asset_id;
    let mut active: checkout::ActiveModel = existing.into();
    active.return_date = Set(Some(dates::today()));
    active.status = Set(checkout::STATUS_RETURNED.to_owned());
    active.return_notes = Set(non_blank(dto.return_notes));
    active.return_condition = Set(return_condition);
    active.updated_at = Set(now.clone());
    let updated = active.update(&txn).await?;

    // 3. Update Asset status
    let asset = Asset::find_by_id(asset_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Associated asset".to_string()))?;

    let mut asset_active: asset::ActiveModel = asset.into();
    asset_active.status = Set(if damaged {
        asset::STATUS_IN_MAINTENANCE.to_owned()
    } else {
        asset::STATUS_AVAILABLE.to_owned()
    });
    asset_active.updated_at = Set(now);
    asset_active.update(&txn).await?;

    txn.commit().await?;

    if damaged {
        tracing::warn!("Asset #{} returned damaged, moved to maintenance", asset_id);
    }
    activity::record(
        db,
        "checkout",
        updated.id,
        "return",
        Some(json!({ "asset_id": asset_id, "condition": updated.return_condition })),
        performed_by,
    )
    .await;

    Ok(updated)
}

/// Count active checkouts
pub async fn count_active_checkouts(db: &DatabaseConnection) -> Result<u64, ServiceError> {
    Ok(Checkout::find()
        .filter(checkout::Column::Status.eq(checkout::STATUS_ACTIVE))
        .count(db)
        .await?)
}

/// Count active checkouts past their due date
pub async fn count_overdue_checkouts(db: &DatabaseConnection) -> Result<u64, ServiceError> {
    Ok(Checkout::find()
        .filter(checkout::Column::Status.eq(checkout::STATUS_ACTIVE))
        .filter(checkout::Column::DueDate.is_not_null())
        .filter(checkout::Column::DueDate.lt(dates::today()))
        .count(db)
        .await?)
}
