//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM queries, no Axum).
//! Only trait definitions, input/output shapes and domain error types.

pub mod errors;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::*;
