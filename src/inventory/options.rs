//! Distinct values offered as filter choices.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::InventoryItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub brands: Vec<String>,
    pub warehouses: Vec<String>,
    pub categories: Vec<String>,
    pub genders: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub designs: Vec<String>,
    pub materials: Vec<String>,
    pub weights: Vec<String>,
}

#[derive(Default)]
struct Sets<'a> {
    brands: BTreeSet<&'a str>,
    warehouses: BTreeSet<&'a str>,
    categories: BTreeSet<&'a str>,
    genders: BTreeSet<&'a str>,
    colors: BTreeSet<&'a str>,
    sizes: BTreeSet<&'a str>,
    designs: BTreeSet<&'a str>,
    materials: BTreeSet<&'a str>,
    weights: BTreeSet<&'a str>,
}

fn add<'a>(set: &mut BTreeSet<&'a str>, value: &'a str) {
    if !value.trim().is_empty() {
        set.insert(value);
    }
}

fn sorted(set: BTreeSet<&str>) -> Vec<String> {
    set.into_iter().map(str::to_string).collect()
}

/// Sorted distinct values per filterable field. Blank values are left out.
pub fn filter_options<'a, I>(items: I) -> FilterOptions
where
    I: IntoIterator<Item = &'a InventoryItem>,
{
    let mut sets = Sets::default();

    for item in items {
        add(&mut sets.brands, &item.brand);
        add(&mut sets.warehouses, &item.warehouse);
        add(&mut sets.categories, &item.category);
        add(&mut sets.genders, item.gender.as_str());
        add(&mut sets.colors, &item.color);
        add(&mut sets.sizes, &item.size);
        add(&mut sets.designs, &item.design);
        add(&mut sets.materials, &item.fabric_specs.material);
        if let Some(weight) = item.fabric_specs.weight.as_deref() {
            add(&mut sets.weights, weight);
        }
    }

    FilterOptions {
        brands: sorted(sets.brands),
        warehouses: sorted(sets.warehouses),
        categories: sorted(sets.categories),
        genders: sorted(sets.genders),
        colors: sorted(sets.colors),
        sizes: sorted(sets.sizes),
        designs: sorted(sets.designs),
        materials: sorted(sets.materials),
        weights: sorted(sets.weights),
    }
}

/// Maps each brand to the sorted warehouses that stock it.
pub fn brand_warehouses<'a, I>(items: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a InventoryItem>,
{
    let mut map: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for item in items {
        map.entry(item.brand.as_str())
            .or_default()
            .insert(item.warehouse.as_str());
    }

    map.into_iter()
        .map(|(brand, warehouses)| (brand.to_string(), sorted(warehouses)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;
    use crate::models::item::fixtures::item;

    #[test]
    fn options_are_sorted_and_distinct() {
        let mut tee = item("TEE", "W2");
        tee.brand = "Alpha".to_string();
        tee.gender = Gender::Female;
        tee.size = "L".to_string();
        tee.color = String::new();
        let items = [item("A", "W1"), item("B", "W1"), tee];

        let options = filter_options(&items);

        assert_eq!(options.brands, vec!["Alpha", "NOM"]);
        assert_eq!(options.warehouses, vec!["W1", "W2"]);
        assert_eq!(options.genders, vec!["female", "male"]);
        assert_eq!(options.sizes, vec!["L", "M"]);
        assert_eq!(options.colors, vec!["Black"]);
        assert_eq!(options.weights, vec!["240 GSM"]);
    }

    #[test]
    fn brand_warehouses_groups_by_brand() {
        let mut other = item("C", "W3");
        other.brand = "Alpha".to_string();
        let items = [item("A", "W2"), item("A", "W1"), item("B", "W1"), other];

        let map = brand_warehouses(&items);

        assert_eq!(map.len(), 2);
        assert_eq!(map["NOM"], vec!["W1", "W2"]);
        assert_eq!(map["Alpha"], vec!["W3"]);
    }
}
