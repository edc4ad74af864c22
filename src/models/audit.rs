use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const CONDITIONS: [&str; 5] = ["good", "fair", "poor", "damaged", "missing"];

pub fn is_valid_condition(condition: &str) -> bool {
    CONDITIONS.contains(&condition)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub asset_id: i32,
    pub audited_by: String,
    pub audit_date: String,
    pub location_found: Option<String>,
    pub condition: String,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Asset,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditDto {
    pub asset_id: i32,
    pub audited_by: Option<String>,
    pub audit_date: Option<String>,
    pub location_found: Option<String>,
    pub condition: String,
    pub notes: Option<String>,
}
