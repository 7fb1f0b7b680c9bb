//! Domain service for inventory items.
//!
//! Creation and key changes go through the SKU/warehouse uniqueness gate.
//! Reads, statistics and filter options are computed from the store.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::ItemId;
use crate::inventory::{FilterOptions, InventoryStats, ItemQuery, UniquenessViolation};
use crate::models::{InventoryItem, ItemPatch, NewItem};

/// Errors specific to inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Conflict(#[from] UniquenessViolation),

    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for InventoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for InventoryError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<UniquenessViolation>() {
            Ok(violation) => Self::Conflict(violation),
            Err(err) => Self::Internal(err.to_string()),
        }
    }
}

/// Domain service trait for inventory CRUD and reporting.
#[async_trait::async_trait]
pub trait InventoryService: Send + Sync {
    /// Creates an item attributed to `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Conflict`] if the SKU already exists in the
    /// warehouse, [`InventoryError::Validation`] for malformed input.
    async fn create(&self, new: NewItem, actor: &str) -> Result<InventoryItem, InventoryError>;

    async fn get(&self, id: &ItemId) -> Result<InventoryItem, InventoryError>;

    /// Lists items matching `query`, capped at the configured maximum.
    async fn list(&self, query: &ItemQuery) -> Result<Vec<InventoryItem>, InventoryError>;

    /// Merges `patch` into the item. Moving the item to a taken
    /// `(sku, warehouse)` is a conflict.
    async fn update(
        &self,
        id: &ItemId,
        patch: ItemPatch,
        actor: &str,
    ) -> Result<InventoryItem, InventoryError>;

    async fn delete(&self, id: &ItemId) -> Result<(), InventoryError>;

    async fn stats(&self) -> Result<InventoryStats, InventoryError>;

    async fn filter_options(&self) -> Result<FilterOptions, InventoryError>;

    async fn brand_warehouses(&self) -> Result<BTreeMap<String, Vec<String>>, InventoryError>;

    async fn count(&self) -> Result<u64, InventoryError>;
}
