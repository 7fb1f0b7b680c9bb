//! SKU + warehouse uniqueness gate.
//!
//! A SKU may repeat across warehouses (size/location variants) but never
//! within one. The storage layer backs this with a unique composite index;
//! this check runs first so callers get a message naming the conflicting
//! pair instead of a raw constraint error.

use thiserror::Error;

use crate::domain::ItemId;
use crate::models::InventoryItem;

/// The identity of an item for uniqueness purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemKey<'a> {
    pub sku: &'a str,
    pub warehouse: &'a str,
}

impl<'a> ItemKey<'a> {
    #[must_use]
    pub const fn new(sku: &'a str, warehouse: &'a str) -> Self {
        Self { sku, warehouse }
    }

    #[must_use]
    pub fn of(item: &'a InventoryItem) -> Self {
        Self::new(&item.sku, &item.warehouse)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SKU '{sku}' already exists in warehouse '{warehouse}'")]
pub struct UniquenessViolation {
    pub sku: String,
    pub warehouse: String,
    pub existing_id: ItemId,
}

/// Rejects `candidate` if any item in `existing` already holds the same
/// `(sku, warehouse)`. The item identified by `ignore` is skipped, so an
/// update may keep its own key.
pub fn check_unique<'i, I>(
    candidate: ItemKey<'_>,
    existing: I,
    ignore: Option<&ItemId>,
) -> Result<(), UniquenessViolation>
where
    I: IntoIterator<Item = &'i InventoryItem>,
{
    let conflict = existing.into_iter().find(|item| {
        ignore != Some(&item.id) && ItemKey::of(item) == candidate
    });

    match conflict {
        Some(item) => Err(UniquenessViolation {
            sku: candidate.sku.to_string(),
            warehouse: candidate.warehouse.to_string(),
            existing_id: item.id.clone(),
        }),
        None => Ok(()),
    }
}
