use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_FULFILLED: &str = "fulfilled";

/// Reservations in these states hold the asset for their date range.
pub const HOLDING_STATUSES: [&str; 2] = [STATUS_PENDING, STATUS_APPROVED];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub asset_id: i32,
    pub employee_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub purpose: Option<String>,
    pub status: String, // 'pending', 'approved', 'cancelled', 'fulfilled'
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
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Employee,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationDto {
    pub asset_id: i32,
    pub employee_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub purpose: Option<String>,
}
