//! Inventory-wide aggregates.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::InventoryItem;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total_items: usize,
    pub total_quantity: i64,
    pub low_stock_items: usize,
    pub categories_count: usize,
    /// Sum of unit price times quantity, rounded to cents.
    pub total_value: f64,
}

/// Folds items into [`InventoryStats`]. An item is low on stock when its
/// quantity is at or below its own threshold; its unit price is the
/// selling price, or the MRP when no selling price is set.
pub fn summarize<'a, I>(items: I) -> InventoryStats
where
    I: IntoIterator<Item = &'a InventoryItem>,
{
    let mut stats = InventoryStats::default();
    let mut categories = HashSet::new();
    let mut value = 0.0;

    for item in items {
        stats.total_items += 1;
        stats.total_quantity += i64::from(item.quantity);
        if item.is_low_stock() {
            stats.low_stock_items += 1;
        }
        categories.insert(item.category.as_str());
        value += item.unit_price() * f64::from(item.quantity);
    }

    stats.categories_count = categories.len();
    stats.total_value = round_cents(value);
    stats
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::fixtures::item;

    fn stocked(sku: &str, quantity: i32, selling: Option<f64>, mrp: f64) -> InventoryItem {
        let mut item = item(sku, "W1");
        item.quantity = quantity;
        item.selling_price = selling;
        item.mrp = mrp;
        item
    }

    #[test]
    fn quantity_and_value_are_summed() {
        let items = vec![
            stocked("A", 5, Some(10.0), 50.0),
            stocked("B", 3, None, 20.0),
        ];

        let stats = summarize(&items);

        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.total_quantity, 8);
        assert!((stats.total_value - 110.0).abs() < f64::EPSILON);
        assert_eq!(stats.categories_count, 1);
    }

    #[test]
    fn low_stock_uses_item_threshold_inclusively() {
        let mut at_threshold = stocked("A", 10, None, 1.0);
        at_threshold.low_stock_threshold = 10;
        let mut above = stocked("B", 4, None, 1.0);
        above.low_stock_threshold = 3;
        let mut custom = stocked("C", 25, None, 1.0);
        custom.low_stock_threshold = 30;

        let stats = summarize(&[at_threshold, above, custom]);

        assert_eq!(stats.low_stock_items, 2);
    }

    #[test]
    fn distinct_categories_are_counted() {
        let mut tops = stocked("A", 1, None, 1.0);
        tops.category = "Tops".to_string();
        let items = [tops, stocked("B", 1, None, 1.0), stocked("C", 1, None, 1.0)];

        assert_eq!(summarize(&items).categories_count, 2);
    }

    #[test]
    fn value_is_rounded_to_cents() {
        let items = [stocked("A", 3, Some(0.1), 1.0)];
        assert!((summarize(&items).total_value - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_inventory_is_all_zero() {
        assert_eq!(summarize(&Vec::<InventoryItem>::new()), InventoryStats::default());
    }
}
