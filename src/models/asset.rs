use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_AVAILABLE: &str = "available";
pub const STATUS_CHECKED_OUT: &str = "checked_out";
pub const STATUS_RESERVED: &str = "reserved";
pub const STATUS_IN_MAINTENANCE: &str = "in_maintenance";
pub const STATUS_RETIRED: &str = "retired";

pub const STATUSES: [&str; 5] = [
    STATUS_AVAILABLE,
    STATUS_CHECKED_OUT,
    STATUS_RESERVED,
    STATUS_IN_MAINTENANCE,
    STATUS_RETIRED,
];

pub fn is_valid_status(status: &str) -> bool {
    STATUSES.contains(&status)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Human-facing inventory tag. Unique across live and soft-deleted rows.
    #[sea_orm(unique)]
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
    /// Lifecycle status.
    /// Valid values:
    /// - `available`: On hand, can be checked out
    /// - `checked_out`: Assigned to an employee (has an active Checkout)
    /// - `reserved`: Held for an approved reservation
    /// - `in_maintenance`: Out of service while a maintenance record is in progress
    /// - `retired`: Decommissioned
    pub status: String,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::checkout::Entity")]
    Checkout,
    #[sea_orm(has_many = "super::maintenance::Entity")]
    Maintenance,
    #[sea_orm(has_many = "super::audit::Entity")]
    Audit,
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservation,
}

impl Related<super::checkout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checkout.def()
    }
}

impl Related<super::maintenance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maintenance.def()
    }
}

impl Related<super::audit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Audit.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
