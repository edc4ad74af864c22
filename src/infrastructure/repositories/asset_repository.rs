//! SeaORM implementation of AssetRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

use crate::domain::{
    Asset, AssetFilter, AssetRepository, CategoryCount, CreateAssetInput, DomainError,
    PaginatedAssets, UpdateAssetInput,
};
use crate::models::asset::{self, ActiveModel, Column, Entity as AssetEntity};
use crate::models::checkout;

/// SeaORM-based implementation of AssetRepository
pub struct SeaOrmAssetRepository {
    db: DatabaseConnection,
}

impl SeaOrmAssetRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Tags are unique across live and soft-deleted rows.
    async fn ensure_tag_free(&self, tag: &str, except_id: Option<i32>) -> Result<(), DomainError> {
        let mut query = AssetEntity::find().filter(Column::AssetTag.eq(tag));
        if let Some(id) = except_id {
            query = query.filter(Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Asset tag '{}' is already in use",
                tag
            )));
        }
        Ok(())
    }

    async fn find_live(&self, id: i32) -> Result<Option<asset::Model>, DomainError> {
        Ok(AssetEntity::find_by_id(id)
            .filter(Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl AssetRepository for SeaOrmAssetRepository {
    async fn find_all(&self, filter: AssetFilter) -> Result<PaginatedAssets, DomainError> {
        let mut query = AssetEntity::find().filter(Column::IsDeleted.eq(false));

        // Apply filters
        if let Some(status) = &filter.status
            && !status.is_empty()
        {
            query = query.filter(Column::Status.eq(status));
        }

        if let Some(category) = &filter.category
            && !category.is_empty()
        {
            query = query.filter(Column::Category.eq(category));
        }

        if let Some(location) = &filter.location
            && !location.is_empty()
        {
            query = query.filter(Column::Location.eq(location));
        }

        if let Some(q) = &filter.q
            && !q.trim().is_empty()
        {
            let q = q.trim();
            let cond = Condition::any()
                .add(Column::AssetTag.contains(q))
                .add(Column::Name.contains(q))
                .add(Column::SerialNumber.contains(q))
                .add(Column::Model.contains(q));
            query = query.filter(cond);
        }

        // Apply sorting
        match filter.sort.as_deref() {
            Some("name_asc") => query = query.order_by_asc(Column::Name),
            Some("name_desc") => query = query.order_by_desc(Column::Name),
            Some("recent") => query = query.order_by_desc(Column::CreatedAt),
            _ => query = query.order_by_asc(Column::AssetTag),
        }

        // Fetch with pagination and total count
        let (assets, total) = if let Some(limit) = filter.limit.filter(|l| *l > 0) {
            let page = filter.page.unwrap_or(0);
            let paginator = query.paginate(&self.db, limit);
            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(page).await?;
            (items, total)
        } else {
            let items = query.all(&self.db).await?;
            let total = items.len() as u64;
            (items, total)
        };

        Ok(PaginatedAssets {
            assets: assets.into_iter().map(Asset::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Asset>, DomainError> {
        Ok(self.find_live(id).await?.map(Asset::from))
    }

    async fn create(&self, input: CreateAssetInput) -> Result<Asset, DomainError> {
        let input = input.normalize()?;
        self.ensure_tag_free(&input.asset_tag, None).await?;

        let now = chrono::Utc::now().to_rfc3339();
        let new_asset = ActiveModel {
            asset_tag: Set(input.asset_tag),
            name: Set(input.name),
            category: Set(input.category),
            manufacturer: Set(input.manufacturer),
            model: Set(input.model),
            serial_number: Set(input.serial_number),
            location: Set(input.location),
            purchase_date: Set(input.purchase_date),
            purchase_cost: Set(input.purchase_cost),
            warranty_expires: Set(input.warranty_expires),
            status: Set(input
                .status
                .unwrap_or_else(|| asset::STATUS_AVAILABLE.to_owned())),
            notes: Set(input.notes),
            is_deleted: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_asset.insert(&self.db).await?;
        Ok(Asset::from(result))
    }

    async fn update(&self, id: i32, input: UpdateAssetInput) -> Result<Asset, DomainError> {
        let input = input.normalize()?;
        let existing = self.find_live(id).await?.ok_or(DomainError::NotFound)?;

        if let Some(tag) = &input.asset_tag
            && tag != &existing.asset_tag
        {
            self.ensure_tag_free(tag, Some(id)).await?;
        }

        if input.status.is_some() && existing.status == asset::STATUS_CHECKED_OUT {
            return Err(DomainError::Conflict(
                "Asset is checked out; return it before changing its status".into(),
            ));
        }

        let mut active: ActiveModel = existing.into();

        if let Some(tag) = input.asset_tag {
            active.asset_tag = Set(tag);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(category) = input.category {
            active.category = Set(crate::utils::non_blank(category));
        }
        if let Some(manufacturer) = input.manufacturer {
            active.manufacturer = Set(crate::utils::non_blank(manufacturer));
        }
        if let Some(model) = input.model {
            active.model = Set(crate::utils::non_blank(model));
        }
        if let Some(serial) = input.serial_number {
            active.serial_number = Set(crate::utils::non_blank(serial));
        }
        if let Some(location) = input.location {
            active.location = Set(crate::utils::non_blank(location));
        }
        if let Some(date) = input.purchase_date {
            active.purchase_date = Set(date);
        }
        if let Some(cost) = input.purchase_cost {
            active.purchase_cost = Set(cost);
        }
        if let Some(date) = input.warranty_expires {
            active.warranty_expires = Set(date);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(crate::utils::non_blank(notes));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(Asset::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let existing = self.find_live(id).await?.ok_or(DomainError::NotFound)?;

        let open_checkout = checkout::Entity::find()
            .filter(checkout::Column::AssetId.eq(id))
            .filter(checkout::Column::Status.eq(checkout::STATUS_ACTIVE))
            .one(&self.db)
            .await?;
        if open_checkout.is_some() {
            return Err(DomainError::Conflict(
                "Asset has an active checkout".into(),
            ));
        }

        let mut active: ActiveModel = existing.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.db).await?;

        Ok(())
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>, DomainError> {
        let assets = AssetEntity::find()
            .filter(Column::IsDeleted.eq(false))
            .filter(Column::Category.is_not_null())
            .all(&self.db)
            .await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for a in assets {
            if let Some(category) = a.category
                && !category.trim().is_empty()
            {
                *counts.entry(category).or_insert(0) += 1;
            }
        }

        let mut categories: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

        Ok(categories)
    }
}
