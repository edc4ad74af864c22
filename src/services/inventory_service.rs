//! Inventory Service - stock movements on consumable items
//!
//! Stock on hand only changes here. Every movement writes an
//! `inventory_transactions` row with the resulting balance, in the same
//! database transaction as the item update.

use sea_orm::*;
use serde_json::json;

use super::{ServiceError, activity};
use crate::models::inventory_item::{self, Entity as InventoryItem};
use crate::models::inventory_transaction::{
    self, Entity as InventoryTransaction, TYPE_ADJUSTMENT, TYPE_ISSUE, TYPE_RECEIPT,
    TransactionDto,
};
use crate::utils::{dates, non_blank};

/// Resolve a requested movement into `(signed delta, balance after)`.
///
/// Receipts and issues take a positive quantity; adjustments take a
/// signed, non-zero delta. Stock may never go below zero.
pub fn compute_movement(
    on_hand: i32,
    transaction_type: &str,
    quantity: i32,
) -> Result<(i32, i32), ServiceError> {
    let delta = match transaction_type {
        TYPE_RECEIPT | TYPE_ISSUE if quantity <= 0 => {
            return Err(ServiceError::Validation(format!(
                "{} quantity must be positive",
                transaction_type
            )));
        }
        TYPE_RECEIPT => quantity,
        TYPE_ISSUE => -quantity,
        TYPE_ADJUSTMENT if quantity == 0 => {
            return Err(ServiceError::Validation(
                "adjustment quantity cannot be zero".to_string(),
            ));
        }
        TYPE_ADJUSTMENT => quantity,
        other => {
            return Err(ServiceError::Validation(format!(
                "Invalid transaction_type '{}'",
                other
            )));
        }
    };

    let balance = on_hand
        .checked_add(delta)
        .ok_or_else(|| ServiceError::Validation("quantity out of range".to_string()))?;
    if balance < 0 {
        return Err(ServiceError::Conflict(format!(
            "Insufficient stock: {} on hand, {} requested",
            on_hand,
            delta.unsigned_abs()
        )));
    }
    Ok((delta, balance))
}

fn default_reference() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("TX-{}", &id[..8].to_uppercase())
}

/// Apply a movement to an already-loaded item inside the caller's transaction.
pub async fn apply_movement<C: ConnectionTrait>(
    conn: &C,
    item: inventory_item::Model,
    dto: TransactionDto,
    performed_by: Option<&str>,
) -> Result<(inventory_item::Model, inventory_transaction::Model), ServiceError> {
    let transaction_type = dto.transaction_type.trim().to_lowercase();
    let (delta, balance) = compute_movement(item.quantity_on_hand, &transaction_type, dto.quantity)?;
    let now = dates::now_rfc3339();

    let tx = inventory_transaction::ActiveModel {
        item_id: Set(item.id),
        transaction_type: Set(transaction_type),
        quantity: Set(delta),
        balance_after: Set(balance),
        reference: Set(non_blank(dto.reference).unwrap_or_else(default_reference)),
        notes: Set(non_blank(dto.notes)),
        performed_by: Set(performed_by.map(str::to_owned)),
        created_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let mut item_active: inventory_item::ActiveModel = item.into();
    item_active.quantity_on_hand = Set(balance);
    item_active.updated_at = Set(now);
    let item = item_active.update(conn).await?;

    Ok((item, tx))
}

/// Record a stock movement against an item
pub async fn record_transaction(
    db: &DatabaseConnection,
    item_id: i32,
    dto: TransactionDto,
    performed_by: Option<&str>,
) -> Result<(inventory_item::Model, inventory_transaction::Model), ServiceError> {
    let txn = db.begin().await?;

    let item = InventoryItem::find_by_id(item_id)
        .filter(inventory_item::Column::IsDeleted.eq(false))
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Inventory item".to_string()))?;

    let (item, tx) = apply_movement(&txn, item, dto, performed_by).await?;
    txn.commit().await?;

    if item.is_low_stock() {
        tracing::warn!(
            "Item {} is at or below reorder level ({} <= {})",
            item.sku,
            item.quantity_on_hand,
            item.reorder_level
        );
    }
    activity::record(
        db,
        "inventory_item",
        item.id,
        &tx.transaction_type,
        Some(json!({ "quantity": tx.quantity, "balance_after": tx.balance_after, "reference": tx.reference })),
        performed_by,
    )
    .await;

    Ok((item, tx))
}

pub async fn list_transactions(
    db: &DatabaseConnection,
    item_id: i32,
) -> Result<Vec<inventory_transaction::Model>, ServiceError> {
    let exists = InventoryItem::find_by_id(item_id).one(db).await?.is_some();
    if !exists {
        return Err(ServiceError::NotFound("Inventory item".to_string()));
    }

    Ok(InventoryTransaction::find()
        .filter(inventory_transaction::Column::ItemId.eq(item_id))
        .order_by_desc(inventory_transaction::Column::Id)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_and_issue() {
        assert_eq!(compute_movement(5, "receipt", 3).unwrap(), (3, 8));
        assert_eq!(compute_movement(5, "issue", 5).unwrap(), (-5, 0));
    }

    #[test]
    fn test_issue_cannot_overdraw() {
        assert!(matches!(
            compute_movement(2, "issue", 3),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            compute_movement(2, "adjustment", -3),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn test_extreme_adjustment_is_refused_not_overflowed() {
        match compute_movement(5, "adjustment", i32::MIN) {
            Err(ServiceError::Conflict(msg)) => assert!(msg.contains("2147483648 requested")),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(matches!(
            compute_movement(5, "receipt", i32::MAX),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_quantity_sign_rules() {
        assert!(matches!(
            compute_movement(2, "receipt", -1),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            compute_movement(2, "adjustment", 0),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(compute_movement(2, "adjustment", -2).unwrap(), (-2, 0));
        assert!(matches!(
            compute_movement(2, "transfer", 1),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_default_reference_shape() {
        let reference = default_reference();
        assert!(reference.starts_with("TX-"));
        assert_eq!(reference.len(), 11);
    }
}
