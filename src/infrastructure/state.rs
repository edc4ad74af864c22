//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{AssetRepository, EmployeeRepository, InventoryRepository};
use crate::infrastructure::{
    SeaOrmAssetRepository, SeaOrmEmployeeRepository, SeaOrmInventoryRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection used by the service layer
    db: DatabaseConnection,
    /// Asset repository
    pub asset_repo: Arc<dyn AssetRepository>,
    /// Employee repository
    pub employee_repo: Arc<dyn EmployeeRepository>,
    /// Inventory item repository
    pub inventory_repo: Arc<dyn InventoryRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let asset_repo = Arc::new(SeaOrmAssetRepository::new(db.clone()));
        let employee_repo = Arc::new(SeaOrmEmployeeRepository::new(db.clone()));
        let inventory_repo = Arc::new(SeaOrmInventoryRepository::new(db.clone()));

        Self {
            db,
            asset_repo,
            employee_repo,
            inventory_repo,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
