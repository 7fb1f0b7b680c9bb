//! `SeaORM` implementation of the `InventoryService` trait.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::domain::ItemId;
use crate::inventory::{
    self, FilterOptions, InventoryStats, ItemKey, ItemQuery, check_unique, summarize,
};
use crate::models::{InventoryItem, ItemPatch, NewItem};
use crate::services::inventory_service::{InventoryError, InventoryService};

pub struct SeaOrmInventoryService {
    store: Arc<Store>,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmInventoryService {
    #[must_use]
    pub const fn new(store: Arc<Store>, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    async fn require(&self, id: &ItemId) -> Result<InventoryItem, InventoryError> {
        self.store
            .get_item(id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(id.clone()))
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl InventoryService for SeaOrmInventoryService {
    async fn create(&self, new: NewItem, actor: &str) -> Result<InventoryItem, InventoryError> {
        let new = new.normalize().map_err(InventoryError::Validation)?;

        let variants = self.store.find_items_by_sku(&new.sku).await?;
        check_unique(ItemKey::new(&new.sku, &new.warehouse), &variants, None)?;

        let default_threshold = self.config.read().await.inventory.default_low_stock_threshold;
        let item = InventoryItem::from_new(new, ItemId::generate(), actor, &now(), default_threshold);

        // The unique index still catches a concurrent insert of the same key.
        self.store.insert_item(&item).await?;

        metrics::counter!("inventory_items_created_total").increment(1);
        info!(id = %item.id, sku = %item.sku, warehouse = %item.warehouse, "Created inventory item");
        Ok(item)
    }

    async fn get(&self, id: &ItemId) -> Result<InventoryItem, InventoryError> {
        self.require(id).await
    }

    async fn list(&self, query: &ItemQuery) -> Result<Vec<InventoryItem>, InventoryError> {
        query.validate().map_err(InventoryError::Validation)?;

        let limit = self.config.read().await.inventory.max_list_results;
        let items = self
            .store
            .list_items(&query.predicate(), query.sort(), Some(limit))
            .await?;

        Ok(items)
    }

    async fn update(
        &self,
        id: &ItemId,
        patch: ItemPatch,
        actor: &str,
    ) -> Result<InventoryItem, InventoryError> {
        let patch = patch.normalize().map_err(InventoryError::Validation)?;
        let mut item = self.require(id).await?;

        if patch.is_empty() {
            return Ok(item);
        }

        if patch.changes_key(&item) {
            let sku = patch.sku.as_deref().unwrap_or(&item.sku);
            let warehouse = patch.warehouse.as_deref().unwrap_or(&item.warehouse);
            let variants = self.store.find_items_by_sku(sku).await?;
            check_unique(ItemKey::new(sku, warehouse), &variants, Some(id))?;
        }

        item.apply(patch);
        item.updated_at = now();
        item.last_modified_by = actor.to_string();

        self.store.update_item(&item).await?;

        info!(id = %item.id, actor, "Updated inventory item");
        Ok(item)
    }

    async fn delete(&self, id: &ItemId) -> Result<(), InventoryError> {
        if !self.store.delete_item(id).await? {
            return Err(InventoryError::NotFound(id.clone()));
        }

        info!(id = %id, "Deleted inventory item");
        Ok(())
    }

    async fn stats(&self) -> Result<InventoryStats, InventoryError> {
        let items = self.store.list_all_items().await?;
        Ok(summarize(&items))
    }

    async fn filter_options(&self) -> Result<FilterOptions, InventoryError> {
        let items = self.store.list_all_items().await?;
        Ok(inventory::filter_options(&items))
    }

    async fn brand_warehouses(&self) -> Result<BTreeMap<String, Vec<String>>, InventoryError> {
        let items = self.store.list_all_items().await?;
        Ok(inventory::brand_warehouses(&items))
    }

    async fn count(&self) -> Result<u64, InventoryError> {
        Ok(self.store.count_items().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::fixtures::new_item;

    async fn service() -> SeaOrmInventoryService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        SeaOrmInventoryService::new(Arc::new(store), Arc::new(RwLock::new(Config::default())))
    }

    #[tokio::test]
    async fn same_sku_in_two_warehouses_then_conflict() {
        let svc = service().await;
        svc.create(new_item("X", "W1"), "a@b.co").await.unwrap();
        svc.create(new_item("X", "W2"), "a@b.co").await.unwrap();

        let err = svc.create(new_item("X", "W1"), "a@b.co").await.unwrap_err();
        let InventoryError::Conflict(violation) = &err else {
            panic!("expected conflict, got {err:?}");
        };
        assert_eq!(violation.sku, "X");
        assert_eq!(violation.warehouse, "W1");
        assert!(err.to_string().contains("'X'") && err.to_string().contains("'W1'"));
        assert_eq!(svc.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_merges_and_records_modifier() {
        let svc = service().await;
        let created = svc.create(new_item("X", "W1"), "creator@b.co").await.unwrap();

        let patch = ItemPatch {
            quantity: Some(2),
            ..ItemPatch::default()
        };
        let updated = svc.update(&created.id, patch, "editor@b.co").await.unwrap();

        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.created_by, "creator@b.co");
        assert_eq!(updated.last_modified_by, "editor@b.co");
        assert_eq!(svc.get(&created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_onto_taken_key_is_conflict() {
        let svc = service().await;
        svc.create(new_item("X", "W1"), "a@b.co").await.unwrap();
        let other = svc.create(new_item("X", "W2"), "a@b.co").await.unwrap();

        let patch = ItemPatch {
            warehouse: Some("W1".to_string()),
            ..ItemPatch::default()
        };
        assert!(matches!(
            svc.update(&other.id, patch, "a@b.co").await,
            Err(InventoryError::Conflict(_))
        ));

        let same_key = ItemPatch {
            warehouse: Some("W2".to_string()),
            quantity: Some(1),
            ..ItemPatch::default()
        };
        assert!(svc.update(&other.id, same_key, "a@b.co").await.is_ok());
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let svc = service().await;
        let id = ItemId::new("missing");
        assert!(matches!(svc.get(&id).await, Err(InventoryError::NotFound(_))));
        assert!(matches!(svc.delete(&id).await, Err(InventoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_create_is_validation_error() {
        let svc = service().await;
        let mut bad = new_item("X", "W1");
        bad.mrp = -1.0;
        assert!(matches!(
            svc.create(bad, "a@b.co").await,
            Err(InventoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn list_is_capped_by_config() {
        let svc = service().await;
        for sku in ["A", "B", "C"] {
            svc.create(new_item(sku, "W1"), "a@b.co").await.unwrap();
        }
        svc.config.write().await.inventory.max_list_results = 2;

        let items = svc.list(&ItemQuery::default()).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn stats_cover_all_items() {
        let svc = service().await;
        svc.create(new_item("A", "W1"), "a@b.co").await.unwrap();
        svc.create(new_item("A", "W2"), "a@b.co").await.unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.total_quantity, 40);
        assert!((stats.total_value - 39_960.0).abs() < 1e-9);
    }
}
