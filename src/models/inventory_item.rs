use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    /// Only ever changed through inventory transactions.
    pub quantity_on_hand: i32,
    pub reorder_level: i32,
    pub location: Option<String>,
    pub unit_cost: Option<f64>,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_transaction::Entity")]
    Transaction,
}

impl Related<super::inventory_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_low_stock(&self) -> bool {
        self.quantity_on_hand <= self.reorder_level
    }

    pub fn stock_value(&self) -> f64 {
        self.unit_cost.unwrap_or(0.0) * f64::from(self.quantity_on_hand)
    }
}
