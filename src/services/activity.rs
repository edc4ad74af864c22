//! Activity log: an append-only trail of who changed what.

use sea_orm::*;
use serde::Deserialize;
use serde_json::Value;

use crate::models::activity_log;

pub async fn log_operation<C: ConnectionTrait>(
    db: &C,
    entity_type: &str,
    entity_id: i32,
    operation: &str,
    payload: Option<Value>,
    performed_by: Option<&str>,
) -> Result<(), DbErr> {
    let log = activity_log::ActiveModel {
        entity_type: Set(entity_type.to_owned()),
        entity_id: Set(entity_id),
        operation: Set(operation.to_owned()),
        payload: Set(payload.map(|v| v.to_string())),
        performed_by: Set(performed_by.map(str::to_owned)),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    activity_log::Entity::insert(log).exec(db).await?;
    Ok(())
}

/// Log without failing the caller; a lost trail entry is only traced.
pub async fn record<C: ConnectionTrait>(
    db: &C,
    entity_type: &str,
    entity_id: i32,
    operation: &str,
    payload: Option<Value>,
    performed_by: Option<&str>,
) {
    if let Err(e) = log_operation(db, entity_type, entity_id, operation, payload, performed_by).await {
        tracing::warn!(
            "Failed to record {} on {} #{}: {}",
            operation,
            entity_type,
            entity_id,
            e
        );
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub limit: Option<u64>,
}

pub async fn list_activity(
    db: &DatabaseConnection,
    filter: ActivityFilter,
) -> Result<Vec<activity_log::Model>, DbErr> {
    let mut query = activity_log::Entity::find();

    if let Some(entity_type) = filter.entity_type {
        query = query.filter(activity_log::Column::EntityType.eq(entity_type));
    }
    if let Some(entity_id) = filter.entity_id {
        query = query.filter(activity_log::Column::EntityId.eq(entity_id));
    }

    query
        .order_by_desc(activity_log::Column::Id)
        .limit(filter.limit.unwrap_or(100))
        .all(db)
        .await
}
