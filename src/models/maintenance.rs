use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

pub const TYPES: [&str; 4] = ["preventive", "corrective", "inspection", "upgrade"];

pub fn is_valid_type(maintenance_type: &str) -> bool {
    TYPES.contains(&maintenance_type)
}

/// Completed and cancelled records are closed to edits and transitions.
pub fn is_open(status: &str) -> bool {
    status == STATUS_SCHEDULED || status == STATUS_IN_PROGRESS
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub asset_id: i32,
    pub title: String,
    pub maintenance_type: String,
    pub status: String, // 'scheduled', 'in_progress', 'completed', 'cancelled'
    pub scheduled_date: Option<String>,
    pub started_at: Option<String>,
    pub completed_date: Option<String>,
    pub cost: Option<f64>,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
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
pub struct MaintenanceDto {
    pub asset_id: i32,
    pub title: String,
    pub maintenance_type: String,
    pub scheduled_date: Option<String>,
    pub cost: Option<f64>,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
}
