//! Maintenance Service - scheduling and closing out service work on assets

use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use super::{ServiceError, activity};
use crate::models::asset::{self, Entity as Asset};
use crate::models::maintenance::{self, Entity as Maintenance, MaintenanceDto};
use crate::utils::{dates, double_option, non_blank};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MaintenanceFilter {
    pub asset_id: Option<i32>,
    pub status: Option<String>,
}

/// Editable fields of an open maintenance record
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMaintenanceDto {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub scheduled_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cost: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub performed_by: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Body of a completion request
#[derive(Debug, Default, Deserialize)]
pub struct CompleteMaintenanceDto {
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub performed_by: Option<String>,
}

fn validate_cost(cost: Option<f64>) -> Result<(), ServiceError> {
    match cost {
        Some(c) if c < 0.0 => Err(ServiceError::Validation(
            "cost cannot be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

pub async fn list_maintenance(
    db: &DatabaseConnection,
    filter: MaintenanceFilter,
) -> Result<Vec<maintenance::Model>, ServiceError> {
    let mut query = Maintenance::find();

    if let Some(asset_id) = filter.asset_id {
        query = query.filter(maintenance::Column::AssetId.eq(asset_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(maintenance::Column::Status.eq(status));
    }

    Ok(query
        .order_by_desc(maintenance::Column::CreatedAt)
        .order_by_desc(maintenance::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_maintenance(
    db: &DatabaseConnection,
    id: i32,
) -> Result<maintenance::Model, ServiceError> {
    Maintenance::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Maintenance record".to_string()))
}

pub async fn schedule_maintenance(
    db: &DatabaseConnection,
    dto: MaintenanceDto,
    performed_by: Option<&str>,
) -> Result<maintenance::Model, ServiceError> {
    let title = dto.title.trim().to_string();
    if title.is_empty() {
        return Err(ServiceError::Validation("title is required".to_string()));
    }
    if !maintenance::is_valid_type(&dto.maintenance_type) {
        return Err(ServiceError::Validation(format!(
            "Invalid maintenance_type '{}'",
            dto.maintenance_type
        )));
    }
    validate_cost(dto.cost)?;
    let scheduled_date = dates::validate_optional("scheduled_date", dto.scheduled_date)
        .map_err(ServiceError::Validation)?;

    let asset = Asset::find_by_id(dto.asset_id)
        .filter(asset::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Asset".to_string()))?;

    let now = dates::now_rfc3339();
    let saved = maintenance::ActiveModel {
        asset_id: Set(asset.id),
        title: Set(title),
        maintenance_type: Set(dto.maintenance_type),
        status: Set(maintenance::STATUS_SCHEDULED.to_owned()),
        scheduled_date: Set(scheduled_date),
        started_at: Set(None),
        completed_date: Set(None),
        cost: Set(dto.cost),
        performed_by: Set(non_blank(dto.performed_by)),
        notes: Set(non_blank(dto.notes)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    activity::record(
        db,
        "maintenance",
        saved.id,
        "create",
        Some(json!({ "asset_id": saved.asset_id, "title": saved.title })),
        performed_by,
    )
    .await;

    Ok(saved)
}

pub async fn update_maintenance(
    db: &DatabaseConnection,
    id: i32,
    dto: UpdateMaintenanceDto,
    performed_by: Option<&str>,
) -> Result<maintenance::Model, ServiceError> {
    let existing = get_maintenance(db, id).await?;
    if !maintenance::is_open(&existing.status) {
        return Err(ServiceError::InvalidState(format!(
            "Maintenance record is {}",
            existing.status
        )));
    }

    let mut active: maintenance::ActiveModel = existing.into();

    if let Some(title) = dto.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::Validation("title cannot be blank".to_string()));
        }
        active.title = Set(title);
    }
    if let Some(date) = dto.scheduled_date {
        active.scheduled_date = Set(
            dates::validate_optional("scheduled_date", date).map_err(ServiceError::Validation)?,
        );
    }
    if let Some(cost) = dto.cost {
        validate_cost(cost)?;
        active.cost = Set(cost);
    }
    if let Some(by) = dto.performed_by {
        active.performed_by = Set(non_blank(by));
    }
    if let Some(notes) = dto.notes {
        active.notes = Set(non_blank(notes));
    }
    active.updated_at = Set(dates::now_rfc3339());

    let updated = active.update(db).await?;
    activity::record(db, "maintenance", updated.id, "update", None, performed_by).await;
    Ok(updated)
}

/// Begin work: the asset leaves service for the duration
pub async fn start_maintenance(
    db: &DatabaseConnection,
    id: i32,
    performed_by: Option<&str>,
) -> Result<maintenance::Model, ServiceError> {
    let now = dates::now_rfc3339();
    let txn = db.begin().await?;

    let existing = Maintenance::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Maintenance record".to_string()))?;

    if existing.status != maintenance::STATUS_SCHEDULED {
        return Err(ServiceError::InvalidState(format!(
            "Only scheduled maintenance can be started (status is {})",
            existing.status
        )));
    }

    let asset = Asset::find_by_id(existing.asset_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Asset".to_string()))?;

    if asset.status == asset::STATUS_CHECKED_OUT {
        return Err(ServiceError::Conflict(
            "Asset is checked out; return it before starting maintenance".to_string(),
        ));
    }

    let mut active: maintenance::ActiveModel = existing.into();
    active.status = Set(maintenance::STATUS_IN_PROGRESS.to_owned());
    active.started_at = Set(Some(now.clone()));
    active.updated_at = Set(now.clone());
    let updated = active.update(&txn).await?;

    if asset.status != asset::STATUS_RETIRED {
        let mut asset_active: asset::ActiveModel = asset.into();
        asset_active.status = Set(asset::STATUS_IN_MAINTENANCE.to_owned());
        asset_active.updated_at = Set(now);
        asset_active.update(&txn).await?;
    }

    txn.commit().await?;

    activity::record(db, "maintenance", updated.id, "start", None, performed_by).await;
    Ok(updated)
}

pub async fn complete_maintenance(
    db: &DatabaseConnection,
    id: i32,
    dto: CompleteMaintenanceDto,
    performed_by: Option<&str>,
) -> Result<maintenance::Model, ServiceError> {
    validate_cost(dto.cost)?;
    close_maintenance(
        db,
        id,
        maintenance::STATUS_COMPLETED,
        Some(dto),
        performed_by,
    )
    .await
}

pub async fn cancel_maintenance(
    db: &DatabaseConnection,
    id: i32,
    performed_by: Option<&str>,
) -> Result<maintenance::Model, ServiceError> {
    close_maintenance(db, id, maintenance::STATUS_CANCELLED, None, performed_by).await
}

/// Shared close-out for complete and cancel. The asset goes back to
/// `available` once no other record for it is still in progress.
async fn close_maintenance(
    db: &DatabaseConnection,
    id: i32,
    final_status: &str,
    completion: Option<CompleteMaintenanceDto>,
    performed_by: Option<&str>,
) -> Result<maintenance::Model, ServiceError> {
    let now = dates::now_rfc3339();
    let txn = db.begin().await?;

    let existing = Maintenance::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Maintenance record".to_string()))?;

    if !maintenance::is_open(&existing.status) {
        return Err(ServiceError::InvalidState(format!(
            "Maintenance record is already {}",
            existing.status
        )));
    }

    let asset_id = existing.asset_id;
    let mut active: maintenance::ActiveModel = existing.into();
    active.status = Set(final_status.to_owned());
    active.updated_at = Set(now.clone());

    if let Some(done) = completion {
        active.completed_date = Set(Some(dates::today()));
        if done.cost.is_some() {
            active.cost = Set(done.cost);
        }
        if let Some(notes) = non_blank(done.notes) {
            active.notes = Set(Some(notes));
        }
        if let Some(by) = non_blank(done.performed_by) {
            active.performed_by = Set(Some(by));
        }
    }

    let updated = active.update(&txn).await?;

    let others_in_progress = Maintenance::find()
        .filter(maintenance::Column::AssetId.eq(asset_id))
        .filter(maintenance::Column::Status.eq(maintenance::STATUS_IN_PROGRESS))
        .count(&txn)
        .await?;

    if others_in_progress == 0
        && let Some(asset) = Asset::find_by_id(asset_id).one(&txn).await?
        && asset.status == asset::STATUS_IN_MAINTENANCE
    {
        let mut asset_active: asset::ActiveModel = asset.into();
        asset_active.status = Set(asset::STATUS_AVAILABLE.to_owned());
        asset_active.updated_at = Set(now);
        asset_active.update(&txn).await?;
    }

    txn.commit().await?;

    tracing::info!("Maintenance #{} {}", updated.id, final_status);
    activity::record(
        db,
        "maintenance",
        updated.id,
        final_status,
        Some(json!({ "asset_id": asset_id, "cost": updated.cost })),
        performed_by,
    )
    .await;

    Ok(updated)
}

pub async fn count_open_maintenance(db: &DatabaseConnection) -> Result<u64, ServiceError> {
    Ok(Maintenance::find()
        .filter(
            maintenance::Column::Status
                .is_in([maintenance::STATUS_SCHEDULED, maintenance::STATUS_IN_PROGRESS]),
        )
        .count(db)
        .await?)
}
