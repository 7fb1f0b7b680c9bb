use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::sea_query::Order;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use crate::domain::{ItemId, SortOrder};
use crate::entities::{inventory_items, prelude::*};
use crate::inventory::query::{ItemPredicate, SortKey};
use crate::inventory::reconcile::ReconcileTarget;
use crate::inventory::uniqueness::UniquenessViolation;
use crate::models::{FabricSpecs, InventoryItem};

/// Repository for inventory item persistence
pub struct InventoryRepository {
    conn: DatabaseConnection,
}

impl TryFrom<inventory_items::Model> for InventoryItem {
    type Error = anyhow::Error;

    fn try_from(m: inventory_items::Model) -> Result<Self> {
        let images: Vec<String> = serde_json::from_str(&m.images)
            .with_context(|| format!("Corrupt images column for item {}", m.id))?;

        Ok(Self {
            gender: m.gender.parse()?,
            status: m.status.parse()?,
            id: ItemId::from(m.id),
            sku: m.sku,
            name: m.name,
            brand: m.brand,
            warehouse: m.warehouse,
            category: m.category,
            color: m.color,
            color_code: m.color_code,
            fabric_specs: FabricSpecs {
                material: m.fabric_material,
                weight: m.fabric_weight,
                composition: m.fabric_composition,
            },
            size: m.size,
            design: m.design,
            mrp: m.mrp,
            selling_price: m.selling_price,
            cost_price: m.cost_price,
            quantity: m.quantity,
            low_stock_threshold: m.low_stock_threshold,
            images,
            created_at: m.created_at,
            updated_at: m.updated_at,
            created_by: m.created_by,
            last_modified_by: m.last_modified_by,
        })
    }
}

impl InventoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn to_active(item: &InventoryItem) -> Result<inventory_items::ActiveModel> {
        Ok(inventory_items::ActiveModel {
            id: Set(item.id.as_str().to_string()),
            sku: Set(item.sku.clone()),
            name: Set(item.name.clone()),
            brand: Set(item.brand.clone()),
            warehouse: Set(item.warehouse.clone()),
            category: Set(item.category.clone()),
            gender: Set(item.gender.as_str().to_string()),
            color: Set(item.color.clone()),
            color_code: Set(item.color_code.clone()),
            fabric_material: Set(item.fabric_specs.material.clone()),
            fabric_weight: Set(item.fabric_specs.weight.clone()),
            fabric_composition: Set(item.fabric_specs.composition.clone()),
            size: Set(item.size.clone()),
            design: Set(item.design.clone()),
            mrp: Set(item.mrp),
            selling_price: Set(item.selling_price),
            cost_price: Set(item.cost_price),
            quantity: Set(item.quantity),
            low_stock_threshold: Set(item.low_stock_threshold),
            images: Set(serde_json::to_string(&item.images)?),
            status: Set(item.status.as_str().to_string()),
            created_at: Set(item.created_at.clone()),
            updated_at: Set(item.updated_at.clone()),
            created_by: Set(item.created_by.clone()),
            last_modified_by: Set(item.last_modified_by.clone()),
        })
    }

    fn map_rows(rows: Vec<inventory_items::Model>) -> Result<Vec<InventoryItem>> {
        rows.into_iter().map(InventoryItem::try_from).collect()
    }

    pub async fn get(&self, id: &ItemId) -> Result<Option<InventoryItem>> {
        InventoryItems::find_by_id(id.as_str())
            .one(&self.conn)
            .await
            .context("Failed to query inventory item")?
            .map(InventoryItem::try_from)
            .transpose()
    }

    /// Items matching `predicate`, ordered by `sort`, at most `limit` rows.
    ///
    /// Clauses SQLite cannot evaluate exactly, such as a non-ASCII search,
    /// are applied to the fetched rows before the limit.
    pub async fn list(
        &self,
        predicate: &ItemPredicate,
        sort: (SortKey, SortOrder),
        limit: Option<u64>,
    ) -> Result<Vec<InventoryItem>> {
        let (key, order) = sort;
        let order = if order.is_ascending() {
            Order::Asc
        } else {
            Order::Desc
        };

        let mut select = InventoryItems::find()
            .filter(predicate.to_condition())
            .order_by(key.column(), order)
            .order_by_asc(inventory_items::Column::Id);
        let exact = predicate.exact_in_sql();
        if exact && let Some(limit) = limit {
            select = select.limit(limit);
        }

        let rows = select
            .all(&self.conn)
            .await
            .context("Failed to list inventory items")?;

        let mut items = Self::map_rows(rows)?;
        if !exact {
            items.retain(|item| predicate.matches(item));
            if let Some(limit) = limit {
                items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            }
        }
        Ok(items)
    }

    pub async fn list_all(&self) -> Result<Vec<InventoryItem>> {
        let rows = InventoryItems::find()
            .order_by_asc(inventory_items::Column::Sku)
            .order_by_asc(inventory_items::Column::Warehouse)
            .all(&self.conn)
            .await
            .context("Failed to list inventory items")?;

        Self::map_rows(rows)
    }

    /// All warehouse variants of a SKU.
    pub async fn find_by_sku(&self, sku: &str) -> Result<Vec<InventoryItem>> {
        let rows = InventoryItems::find()
            .filter(inventory_items::Column::Sku.eq(sku))
            .order_by_asc(inventory_items::Column::Warehouse)
            .all(&self.conn)
            .await
            .context("Failed to query items by SKU")?;

        Self::map_rows(rows)
    }

    pub async fn find_by_key(&self, sku: &str, warehouse: &str) -> Result<Option<InventoryItem>> {
        InventoryItems::find()
            .filter(inventory_items::Column::Sku.eq(sku))
            .filter(inventory_items::Column::Warehouse.eq(warehouse))
            .one(&self.conn)
            .await
            .context("Failed to query item by SKU and warehouse")?
            .map(InventoryItem::try_from)
            .transpose()
    }

    /// Inserts a new item. A taken `(sku, warehouse)` comes back as a
    /// [`UniquenessViolation`] inside the error.
    pub async fn insert(&self, item: &InventoryItem) -> Result<()> {
        let active = Self::to_active(item)?;
        match InventoryItems::insert(active).exec(&self.conn).await {
            Ok(_) => Ok(()),
            Err(err) => Err(self.translate_write_error(err, item).await),
        }
    }

    /// Writes every column of an existing item.
    pub async fn update(&self, item: &InventoryItem) -> Result<()> {
        let active = Self::to_active(item)?;
        match active.update(&self.conn).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => {
                anyhow::bail!("Inventory item not found: {}", item.id)
            }
            Err(err) => Err(self.translate_write_error(err, item).await),
        }
    }

    pub async fn delete(&self, id: &ItemId) -> Result<bool> {
        let result = InventoryItems::delete_by_id(id.as_str())
            .exec(&self.conn)
            .await
            .context("Failed to delete inventory item")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        InventoryItems::find()
            .count(&self.conn)
            .await
            .context("Failed to count inventory items")
    }

    async fn translate_write_error(&self, err: DbErr, item: &InventoryItem) -> anyhow::Error {
        if !matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return anyhow::Error::new(err).context("Failed to write inventory item");
        }

        let existing_id = self
            .find_by_key(&item.sku, &item.warehouse)
            .await
            .ok()
            .flatten()
            .map(|existing| existing.id)
            .unwrap_or_default();

        anyhow::Error::new(UniquenessViolation {
            sku: item.sku.clone(),
            warehouse: item.warehouse.clone(),
            existing_id,
        })
    }
}

#[async_trait]
impl ReconcileTarget for InventoryRepository {
    async fn find_by_sku(&self, sku: &str) -> Result<Vec<InventoryItem>> {
        Self::find_by_sku(self, sku).await
    }

    async fn insert(&self, item: InventoryItem) -> Result<()> {
        Self::insert(self, &item).await
    }

    async fn update(&self, item: InventoryItem) -> Result<()> {
        Self::update(self, &item).await
    }
}
