//! Repository implementations using SeaORM

pub mod asset_repository;
pub mod employee_repository;
pub mod inventory_repository;

pub use asset_repository::SeaOrmAssetRepository;
pub use employee_repository::SeaOrmEmployeeRepository;
pub use inventory_repository::SeaOrmInventoryRepository;
