//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Resource not found
    #[error("Resource not found")]
    NotFound,
    /// Validation error with message
    #[error("Validation error: {0}")]
    Validation(String),
    /// Unique key or state clash
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => DomainError::Conflict(msg),
            _ => DomainError::Database(e.to_string()),
        }
    }
}
