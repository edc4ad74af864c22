//! Audit Service - physical verification of assets

use sea_orm::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};

use super::{ServiceError, activity};
use crate::models::asset::{self, Entity as Asset};
use crate::models::audit::{self, AuditDto, Entity as Audit};
use crate::utils::{dates, non_blank};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuditFilter {
    pub asset_id: Option<i32>,
    pub condition: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuditSummary {
    pub total_audits: u64,
    pub by_condition: BTreeMap<String, u64>,
    pub never_audited: u64,
}

pub async fn list_audits(
    db: &DatabaseConnection,
    filter: AuditFilter,
) -> Result<Vec<audit::Model>, ServiceError> {
    let mut query = Audit::find();

    if let Some(asset_id) = filter.asset_id {
        query = query.filter(audit::Column::AssetId.eq(asset_id));
    }
    if let Some(condition) = filter.condition {
        query = query.filter(audit::Column::Condition.eq(condition));
    }
    if let Some(from) = dates::validate_optional("from", filter.from)
        .map_err(ServiceError::Validation)?
    {
        query = query.filter(audit::Column::AuditDate.gte(from));
    }
    if let Some(to) =
        dates::validate_optional("to", filter.to).map_err(ServiceError::Validation)?
    {
        query = query.filter(audit::Column::AuditDate.lte(to));
    }

    Ok(query
        .order_by_desc(audit::Column::AuditDate)
        .order_by_desc(audit::Column::Id)
        .all(db)
        .await?)
}

/// Record an audit. A differing `location_found` moves the asset there.
pub async fn record_audit(
    db: &DatabaseConnection,
    dto: AuditDto,
    performed_by: Option<&str>,
) -> Result<audit::Model, ServiceError> {
    let condition = dto.condition.trim().to_lowercase();
    if !audit::is_valid_condition(&condition) {
        return Err(ServiceError::Validation(format!(
            "Invalid condition '{}'",
            dto.condition
        )));
    }
    let audit_date = dates::validate_optional("audit_date", dto.audit_date)
        .map_err(ServiceError::Validation)?
        .unwrap_or_else(dates::today);
    let audited_by = non_blank(dto.audited_by)
        .or_else(|| performed_by.map(str::to_owned))
        .unwrap_or_else(|| "unknown".to_string());
    let location_found = non_blank(dto.location_found);

    let now = dates::now_rfc3339();
    let txn = db.begin().await?;

    let asset = Asset::find_by_id(dto.asset_id)
        .filter(asset::Column::IsDeleted.eq(false))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Asset".to_string()))?;

    let saved = audit::ActiveModel {
        asset_id: Set(asset.id),
        audited_by: Set(audited_by),
        audit_date: Set(audit_date),
        location_found: Set(location_found.clone()),
        condition: Set(condition),
        notes: Set(non_blank(dto.notes)),
        created_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(found) = location_found
        && asset.location.as_deref() != Some(found.as_str())
    {
        tracing::info!(
            "Audit moved asset {} from {:?} to {}",
            asset.asset_tag,
            asset.location,
            found
        );
        let mut asset_active: asset::ActiveModel = asset.into();
        asset_active.location = Set(Some(found));
        asset_active.updated_at = Set(now);
        asset_active.update(&txn).await?;
    }

    txn.commit().await?;

    activity::record(
        db,
        "audit",
        saved.id,
        "create",
        Some(json!({ "asset_id": saved.asset_id, "condition": saved.condition })),
        performed_by,
    )
    .await;

    Ok(saved)
}

pub async fn delete_audit(
    db: &DatabaseConnection,
    id: i32,
    performed_by: Option<&str>,
) -> Result<(), ServiceError> {
    let result = Audit::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound("Audit".to_string()));
    }
    activity::record(db, "audit", id, "delete", None, performed_by).await;
    Ok(())
}

pub async fn audit_summary(db: &DatabaseConnection) -> Result<AuditSummary, ServiceError> {
    let audits = Audit::find().all(db).await?;

    let mut by_condition: BTreeMap<String, u64> = audit::CONDITIONS
        .iter()
        .map(|c| (c.to_string(), 0))
        .collect();
    let mut audited: HashSet<i32> = HashSet::new();
    for a in &audits {
        *by_condition.entry(a.condition.clone()).or_insert(0) += 1;
        audited.insert(a.asset_id);
    }

    let live_assets = Asset::find()
        .filter(asset::Column::IsDeleted.eq(false))
        .all(db)
        .await?;
    let never_audited = live_assets
        .iter()
        .filter(|a| !audited.contains(&a.id))
        .count() as u64;

    Ok(AuditSummary {
        total_audits: audits.len() as u64,
        by_condition,
        never_audited,
    })
}
