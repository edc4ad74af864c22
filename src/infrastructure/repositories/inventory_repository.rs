//! SeaORM implementation of InventoryRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::domain::{
    CreateInventoryItemInput, DomainError, InventoryFilter, InventoryItem, InventoryRepository,
    UpdateInventoryItemInput,
};
use crate::models::inventory_item::{ActiveModel, Column, Entity as ItemEntity};
use crate::models::inventory_transaction::{TYPE_RECEIPT, TransactionDto};
use crate::services::inventory_service;

/// SeaORM-based implementation of InventoryRepository
pub struct SeaOrmInventoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmInventoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_sku_free(&self, sku: &str, except_id: Option<i32>) -> Result<(), DomainError> {
        let mut query = ItemEntity::find().filter(Column::Sku.eq(sku));
        if let Some(id) = except_id {
            query = query.filter(Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "SKU '{}' is already in use",
                sku
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for SeaOrmInventoryRepository {
    async fn find_all(&self, filter: InventoryFilter) -> Result<Vec<InventoryItem>, DomainError> {
        let mut query = ItemEntity::find().filter(Column::IsDeleted.eq(false));

        if let Some(category) = &filter.category
            && !category.is_empty()
        {
            query = query.filter(Column::Category.eq(category));
        }
        if let Some(q) = &filter.q
            && !q.trim().is_empty()
        {
            let q = q.trim();
            query = query.filter(
                Condition::any()
                    .add(Column::Sku.contains(q))
                    .add(Column::Name.contains(q)),
            );
        }

        let items = query.order_by_asc(Column::Sku).all(&self.db).await?;

        Ok(items
            .into_iter()
            .filter(|i| !filter.low_stock.unwrap_or(false) || i.is_low_stock())
            .map(InventoryItem::from)
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<InventoryItem>, DomainError> {
        Ok(ItemEntity::find_by_id(id)
            .filter(Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .map(InventoryItem::from))
    }

    async fn create(
        &self,
        input: CreateInventoryItemInput,
        performed_by: Option<String>,
    ) -> Result<InventoryItem, DomainError> {
        let input = input.normalize()?;
        self.ensure_sku_free(&input.sku, None).await?;

        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.db.begin().await?;

        let item = ActiveModel {
            sku: Set(input.sku),
            name: Set(input.name),
            category: Set(input.category),
            unit: Set(input.unit.unwrap_or_else(|| "each".to_owned())),
            quantity_on_hand: Set(0),
            reorder_level: Set(input.reorder_level.unwrap_or(0)),
            location: Set(input.location),
            unit_cost: Set(input.unit_cost),
            is_deleted: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // Opening stock goes through the ledger like any other receipt
        let item = match input.opening_quantity.filter(|q| *q > 0) {
            Some(quantity) => {
                let dto = TransactionDto {
                    transaction_type: TYPE_RECEIPT.to_owned(),
                    quantity,
                    reference: Some("OPENING".to_owned()),
                    notes: Some("Opening balance".to_owned()),
                };
                inventory_service::apply_movement(&txn, item, dto, performed_by.as_deref())
                    .await?
                    .0
            }
            None => item,
        };

        txn.commit().await?;
        Ok(InventoryItem::from(item))
    }

    async fn update(
        &self,
        id: i32,
        input: UpdateInventoryItemInput,
    ) -> Result<InventoryItem, DomainError> {
        let input = input.normalize()?;
        let existing = ItemEntity::find_by_id(id)
            .filter(Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        if let Some(sku) = &input.sku
            && sku != &existing.sku
        {
            self.ensure_sku_free(sku, Some(id)).await?;
        }

        let mut active: ActiveModel = existing.into();
        if let Some(sku) = input.sku {
            active.sku = Set(sku);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(category) = input.category {
            active.category = Set(crate::utils::non_blank(category));
        }
        if let Some(unit) = crate::utils::non_blank(input.unit) {
            active.unit = Set(unit);
        }
        if let Some(level) = input.reorder_level {
            active.reorder_level = Set(level);
        }
        if let Some(location) = input.location {
            active.location = Set(crate::utils::non_blank(location));
        }
        if let Some(cost) = input.unit_cost {
            active.unit_cost = Set(cost);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(InventoryItem::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let existing = ItemEntity::find_by_id(id)
            .filter(Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.db).await?;

        Ok(())
    }
}
