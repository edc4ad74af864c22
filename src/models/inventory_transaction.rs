use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const TYPE_RECEIPT: &str = "receipt";
pub const TYPE_ISSUE: &str = "issue";
pub const TYPE_ADJUSTMENT: &str = "adjustment";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_id: i32,
    pub transaction_type: String, // 'receipt', 'issue', 'adjustment'
    /// Signed change applied to the item's stock.
    pub quantity: i32,
    pub balance_after: i32,
    pub reference: String,
    pub notes: Option<String>,
    pub performed_by: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::ItemId",
        to = "super::inventory_item::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Item,
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionDto {
    pub transaction_type: String,
    pub quantity: i32,
    pub reference: Option<String>,
    pub notes: Option<String>,
}
