//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;
use crate::models::asset;
use crate::utils::{dates, double_option, non_blank};

/// Filter criteria for asset queries
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AssetFilter {
    pub q: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Paginated result with total count
#[derive(Debug)]
pub struct PaginatedAssets {
    pub assets: Vec<Asset>,
    pub total: u64,
}

/// Asset data for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i32,
    pub asset_tag: String,
    pub name: String,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<String>,
    pub purchase_cost: Option<f64>,
    pub warranty_expires: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<asset::Model> for Asset {
    fn from(model: asset::Model) -> Self {
        Self {
            id: model.id,
            asset_tag: model.asset_tag,
            name: model.name,
            category: model.category,
            manufacturer: model.manufacturer,
            model: model.model,
            serial_number: model.serial_number,
            location: model.location,
            purchase_date: model.purchase_date,
            purchase_cost: model.purchase_cost,
            warranty_expires: model.warranty_expires,
            status: model.status,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Input for creating an asset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAssetInput {
    pub asset_tag: String,
    pub name: String,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<String>,
    pub purchase_cost: Option<f64>,
    pub warranty_expires: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl CreateAssetInput {
    /// Trim text fields, normalise dates and check the invariants a new
    /// asset must satisfy before it reaches the database.
    pub fn normalize(mut self) -> Result<Self, DomainError> {
        self.asset_tag = self.asset_tag.trim().to_string();
        self.name = self.name.trim().to_string();
        if self.asset_tag.is_empty() {
            return Err(DomainError::Validation("asset_tag is required".into()));
        }
        if self.name.is_empty() {
            return Err(DomainError::Validation("name is required".into()));
        }

        let status = non_blank(self.status.take()).unwrap_or_else(|| asset::STATUS_AVAILABLE.into());
        if !asset::is_valid_status(&status) {
            return Err(DomainError::Validation(format!("Invalid status '{}'", status)));
        }
        if status == asset::STATUS_CHECKED_OUT {
            return Err(DomainError::Validation(
                "Assets can only become checked_out through a checkout".into(),
            ));
        }
        self.status = Some(status);

        if let Some(cost) = self.purchase_cost
            && cost < 0.0
        {
            return Err(DomainError::Validation("purchase_cost cannot be negative".into()));
        }

        self.purchase_date = dates::validate_optional("purchase_date", self.purchase_date.take())
            .map_err(DomainError::Validation)?;
        self.warranty_expires =
            dates::validate_optional("warranty_expires", self.warranty_expires.take())
                .map_err(DomainError::Validation)?;

        self.category = non_blank(self.category.take());
        self.manufacturer = non_blank(self.manufacturer.take());
        self.model = non_blank(self.model.take());
        self.serial_number = non_blank(self.serial_number.take());
        self.location = non_blank(self.location.take());
        self.notes = non_blank(self.notes.take());

        Ok(self)
    }
}

/// Input for a partial asset update. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssetInput {
    pub asset_tag: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub manufacturer: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub serial_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub purchase_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub purchase_cost: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub warranty_expires: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl UpdateAssetInput {
    pub fn normalize(mut self) -> Result<Self, DomainError> {
        if let Some(tag) = self.asset_tag.take() {
            let tag = tag.trim().to_string();
            if tag.is_empty() {
                return Err(DomainError::Validation("asset_tag cannot be blank".into()));
            }
            self.asset_tag = Some(tag);
        }
        if let Some(name) = self.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::Validation("name cannot be blank".into()));
            }
            self.name = Some(name);
        }
        if let Some(status) = &self.status {
            if !asset::is_valid_status(status) {
                return Err(DomainError::Validation(format!("Invalid status '{}'", status)));
            }
            if status == asset::STATUS_CHECKED_OUT {
                return Err(DomainError::Validation(
                    "Assets can only become checked_out through a checkout".into(),
                ));
            }
        }
        if let Some(Some(cost)) = self.purchase_cost
            && cost < 0.0
        {
            return Err(DomainError::Validation("purchase_cost cannot be negative".into()));
        }
        if let Some(date) = self.purchase_date.take() {
            self.purchase_date = Some(
                dates::validate_optional("purchase_date", date).map_err(DomainError::Validation)?,
            );
        }
        if let Some(date) = self.warranty_expires.take() {
            self.warranty_expires = Some(
                dates::validate_optional("warranty_expires", date)
                    .map_err(DomainError::Validation)?,
            );
        }
        Ok(self)
    }
}

/// Category with the number of live assets in it
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Repository trait for Asset entity
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Find live assets matching the filter criteria with pagination support
    async fn find_all(&self, filter: AssetFilter) -> Result<PaginatedAssets, DomainError>;

    /// Find a live asset by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Asset>, DomainError>;

    /// Create a new asset
    async fn create(&self, input: CreateAssetInput) -> Result<Asset, DomainError>;

    /// Update an existing asset
    async fn update(&self, id: i32, input: UpdateAssetInput) -> Result<Asset, DomainError>;

    /// Soft-delete an asset by ID
    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Distinct categories of live assets
    async fn categories(&self) -> Result<Vec<CategoryCount>, DomainError>;
}

/// Employee data for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl From<crate::models::employee::Model> for Employee {
    fn from(model: crate::models::employee::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            department: model.department,
            phone: model.phone,
            notes: model.notes,
            is_active: model.is_active,
        }
    }
}

/// Filter parameters for listing employees
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub include_inactive: Option<bool>,
}

/// Input for creating or replacing an employee
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    pub email: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl EmployeeInput {
    pub fn normalize(mut self) -> Result<Self, DomainError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::Validation("name is required".into()));
        }
        self.email = non_blank(self.email.take());
        if let Some(email) = &self.email
            && !email.contains('@')
        {
            return Err(DomainError::Validation(format!("Invalid email '{}'", email)));
        }
        self.department = non_blank(self.department.take());
        self.phone = non_blank(self.phone.take());
        self.notes = non_blank(self.notes.take());
        Ok(self)
    }
}

/// Repository trait for Employee entity
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// List employees, active only unless asked otherwise
    async fn find_all(&self, filter: EmployeeFilter) -> Result<Vec<Employee>, DomainError>;

    /// Find an employee by ID (active or not)
    async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, DomainError>;

    /// Create a new employee
    async fn create(&self, input: EmployeeInput) -> Result<Employee, DomainError>;

    /// Replace an employee's details
    async fn update(&self, id: i32, input: EmployeeInput) -> Result<Employee, DomainError>;

    /// Soft-delete (deactivate) an employee
    async fn deactivate(&self, id: i32) -> Result<(), DomainError>;
}

/// Filter parameters for listing inventory items
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InventoryFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub low_stock: Option<bool>,
}

/// Inventory item data for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub quantity_on_hand: i32,
    pub reorder_level: i32,
    pub location: Option<String>,
    pub unit_cost: Option<f64>,
    pub low_stock: bool,
    pub stock_value: f64,
}

impl From<crate::models::inventory_item::Model> for InventoryItem {
    fn from(model: crate::models::inventory_item::Model) -> Self {
        let low_stock = model.is_low_stock();
        let stock_value = model.stock_value();
        Self {
            id: model.id,
            sku: model.sku,
            name: model.name,
            category: model.category,
            unit: model.unit,
            quantity_on_hand: model.quantity_on_hand,
            reorder_level: model.reorder_level,
            location: model.location,
            unit_cost: model.unit_cost,
            low_stock,
            stock_value,
        }
    }
}

/// Input for creating an inventory item. The opening quantity is booked
/// as a receipt transaction, never written directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateInventoryItemInput {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub reorder_level: Option<i32>,
    pub location: Option<String>,
    pub unit_cost: Option<f64>,
    pub opening_quantity: Option<i32>,
}

impl CreateInventoryItemInput {
    pub fn normalize(mut self) -> Result<Self, DomainError> {
        self.sku = self.sku.trim().to_string();
        self.name = self.name.trim().to_string();
        if self.sku.is_empty() {
            return Err(DomainError::Validation("sku is required".into()));
        }
        if self.name.is_empty() {
            return Err(DomainError::Validation("name is required".into()));
        }
        if self.reorder_level.unwrap_or(0) < 0 {
            return Err(DomainError::Validation("reorder_level cannot be negative".into()));
        }
        if self.opening_quantity.unwrap_or(0) < 0 {
            return Err(DomainError::Validation("opening_quantity cannot be negative".into()));
        }
        if let Some(cost) = self.unit_cost
            && cost < 0.0
        {
            return Err(DomainError::Validation("unit_cost cannot be negative".into()));
        }
        self.unit = Some(non_blank(self.unit.take()).unwrap_or_else(|| "each".into()));
        self.category = non_blank(self.category.take());
        self.location = non_blank(self.location.take());
        Ok(self)
    }
}

/// Partial update of an inventory item. Stock is not editable here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInventoryItemInput {
    pub sku: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub unit: Option<String>,
    pub reorder_level: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub unit_cost: Option<Option<f64>>,
}

impl UpdateInventoryItemInput {
    pub fn normalize(mut self) -> Result<Self, DomainError> {
        if let Some(sku) = self.sku.take() {
            let sku = sku.trim().to_string();
            if sku.is_empty() {
                return Err(DomainError::Validation("sku cannot be blank".into()));
            }
            self.sku = Some(sku);
        }
        if let Some(name) = self.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::Validation("name cannot be blank".into()));
            }
            self.name = Some(name);
        }
        if let Some(level) = self.reorder_level
            && level < 0
        {
            return Err(DomainError::Validation("reorder_level cannot be negative".into()));
        }
        if let Some(Some(cost)) = self.unit_cost
            && cost < 0.0
        {
            return Err(DomainError::Validation("unit_cost cannot be negative".into()));
        }
        Ok(self)
    }
}

/// Repository trait for InventoryItem entity
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn find_all(&self, filter: InventoryFilter) -> Result<Vec<InventoryItem>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<InventoryItem>, DomainError>;

    /// Create an item, booking any opening quantity as a receipt
    async fn create(
        &self,
        input: CreateInventoryItemInput,
        performed_by: Option<String>,
    ) -> Result<InventoryItem, DomainError>;

    async fn update(
        &self,
        id: i32,
        input: UpdateInventoryItemInput,
    ) -> Result<InventoryItem, DomainError>;

    /// Soft-delete an item
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_input(tag: &str, name: &str) -> CreateAssetInput {
        CreateAssetInput {
            asset_tag: tag.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_asset_defaults_to_available() {
        let input = asset_input(" LT-001 ", "Laptop").normalize().unwrap();
        assert_eq!(input.asset_tag, "LT-001");
        assert_eq!(input.status.as_deref(), Some("available"));
    }

    #[test]
    fn test_create_asset_rejects_blank_and_checked_out() {
        assert!(matches!(
            asset_input("  ", "Laptop").normalize(),
            Err(DomainError::Validation(_))
        ));
        let mut input = asset_input("LT-1", "Laptop");
        input.status = Some("checked_out".into());
        assert!(matches!(input.normalize(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_create_asset_rejects_bad_dates_and_cost() {
        let mut input = asset_input("LT-1", "Laptop");
        input.purchase_date = Some("31/12/2023".into());
        assert!(input.normalize().is_err());

        let mut input = asset_input("LT-1", "Laptop");
        input.purchase_cost = Some(-1.0);
        assert!(input.normalize().is_err());
    }

    #[test]
    fn test_update_asset_clearing_date_is_allowed() {
        let input = UpdateAssetInput {
            purchase_date: Some(None),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(input.purchase_date, Some(None));
    }

    #[test]
    fn test_employee_email_must_look_like_email() {
        let input = EmployeeInput {
            name: "Ada".into(),
            email: Some("not-an-email".into()),
            department: None,
            phone: None,
            notes: None,
            is_active: None,
        };
        assert!(input.normalize().is_err());
    }

    #[test]
    fn test_inventory_defaults_unit() {
        let input = CreateInventoryItemInput {
            sku: "TONER-1".into(),
            name: "Toner".into(),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(input.unit.as_deref(), Some("each"));
    }
}
