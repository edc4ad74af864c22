//! Services Layer
//!
//! Business workflows that touch more than one table (checkouts, maintenance,
//! stock movements, ...). Handlers stay thin and call into these.

pub mod activity;
pub mod audit_service;
pub mod checkout_service;
pub mod dashboard_service;
pub mod history_service;
pub mod inventory_service;
pub mod maintenance_service;
pub mod report_service;
pub mod reservation_service;

use sea_orm::SqlErr;
use thiserror::Error;

use crate::domain::DomainError;

/// Error type for service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Conflict(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        // A unique index losing a race is a clash, not a server fault
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(msg),
            _ => ServiceError::Database(e.to_string()),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => ServiceError::NotFound("Resource".into()),
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::Database(msg) | DomainError::Internal(msg) => ServiceError::Database(msg),
        }
    }
}

impl From<ServiceError> for DomainError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => DomainError::NotFound,
            ServiceError::Validation(msg) => DomainError::Validation(msg),
            ServiceError::InvalidState(msg) | ServiceError::Conflict(msg) => {
                DomainError::Conflict(msg)
            }
            ServiceError::Database(msg) => DomainError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::{asset, checkout, employee};
    use sea_orm::{ActiveModelTrait, Set};

    fn asset_row(tag: &str) -> asset::ActiveModel {
        asset::ActiveModel {
            asset_tag: Set(tag.to_string()),
            name: Set("Laptop".to_string()),
            status: Set(asset::STATUS_AVAILABLE.to_string()),
            is_deleted: Set(false),
            created_at: Set("2024-01-01T00:00:00Z".to_string()),
            updated_at: Set("2024-01-01T00:00:00Z".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let db = init_db("sqlite::memory:").await.expect("Failed to init db");
        asset_row("LT-1").insert(&db).await.unwrap();

        let err = asset_row("LT-1").insert(&db).await.unwrap_err();
        assert!(matches!(ServiceError::from(err), ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_second_active_checkout_maps_to_conflict() {
        let db = init_db("sqlite::memory:").await.expect("Failed to init db");
        let laptop = asset_row("LT-1").insert(&db).await.unwrap();
        let ada = employee::ActiveModel {
            name: Set("Ada".to_string()),
            is_active: Set(true),
            created_at: Set("2024-01-01T00:00:00Z".to_string()),
            updated_at: Set("2024-01-01T00:00:00Z".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let active = || checkout::ActiveModel {
            asset_id: Set(laptop.id),
            employee_id: Set(ada.id),
            checkout_date: Set("2024-01-02".to_string()),
            status: Set(checkout::STATUS_ACTIVE.to_string()),
            created_at: Set("2024-01-02T00:00:00Z".to_string()),
            updated_at: Set("2024-01-02T00:00:00Z".to_string()),
            ..Default::default()
        };
        active().insert(&db).await.unwrap();

        let err = active().insert(&db).await.unwrap_err();
        assert!(matches!(ServiceError::from(err), ServiceError::Conflict(_)));
        assert!(matches!(
            DomainError::from(ServiceError::from(sea_orm::DbErr::Custom("boom".into()))),
            DomainError::Database(_)
        ));
    }
}
