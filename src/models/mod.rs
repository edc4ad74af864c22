pub mod activity_log;
pub mod asset;
pub mod audit;
pub mod checkout;
pub mod employee;
pub mod inventory_item;
pub mod inventory_transaction;
pub mod maintenance;
pub mod report;
pub mod reservation;
pub mod user;
