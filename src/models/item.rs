use serde::{Deserialize, Serialize};

use crate::domain::{Gender, ItemId, ItemStatus};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricSpecs {
    pub material: String,
    pub weight: Option<String>,
    pub composition: Option<String>,
}

/// Field-wise update of [`FabricSpecs`]; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricPatch {
    pub material: Option<String>,
    pub weight: Option<String>,
    pub composition: Option<String>,
}

impl FabricPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.material.is_none() && self.weight.is_none() && self.composition.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub warehouse: String,
    pub category: String,
    pub gender: Gender,
    pub color: String,
    pub color_code: Option<String>,
    pub fabric_specs: FabricSpecs,
    pub size: String,
    pub design: String,
    pub mrp: f64,
    pub selling_price: Option<f64>,
    pub cost_price: Option<f64>,
    pub quantity: i32,
    pub low_stock_threshold: i32,
    pub images: Vec<String>,
    pub status: ItemStatus,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: String,
    pub last_modified_by: String,
}

impl InventoryItem {
    /// Builds a stored item from a create request. `default_threshold`
    /// applies when the request leaves `low_stock_threshold` unset.
    #[must_use]
    pub fn from_new(
        new: NewItem,
        id: ItemId,
        actor: &str,
        now: &str,
        default_threshold: i32,
    ) -> Self {
        Self {
            id,
            sku: new.sku,
            name: new.name,
            brand: new.brand,
            warehouse: new.warehouse,
            category: new.category,
            gender: new.gender,
            color: new.color,
            color_code: new.color_code,
            fabric_specs: new.fabric_specs,
            size: new.size,
            design: new.design,
            mrp: new.mrp,
            selling_price: new.selling_price,
            cost_price: new.cost_price,
            quantity: new.quantity,
            low_stock_threshold: new.low_stock_threshold.unwrap_or(default_threshold),
            images: new.images,
            status: new.status,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            created_by: actor.to_string(),
            last_modified_by: actor.to_string(),
        }
    }

    /// Price used for valuation: selling price when set, else MRP.
    #[must_use]
    pub fn unit_price(&self) -> f64 {
        self.selling_price.unwrap_or(self.mrp)
    }

    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    /// Merges the set fields of `patch` into this item. Returns `true` if
    /// anything was set.
    pub fn apply(&mut self, patch: ItemPatch) -> bool {
        if patch.is_empty() {
            return false;
        }

        macro_rules! merge {
            ($($field:ident),+) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })+
            };
        }

        merge!(
            sku,
            name,
            brand,
            warehouse,
            category,
            gender,
            color,
            size,
            design,
            mrp,
            quantity,
            low_stock_threshold,
            images,
            status
        );

        if patch.color_code.is_some() {
            self.color_code = patch.color_code;
        }
        if patch.selling_price.is_some() {
            self.selling_price = patch.selling_price;
        }
        if patch.cost_price.is_some() {
            self.cost_price = patch.cost_price;
        }

        if let Some(fabric) = patch.fabric_specs {
            if let Some(material) = fabric.material {
                self.fabric_specs.material = material;
            }
            if fabric.weight.is_some() {
                self.fabric_specs.weight = fabric.weight;
            }
            if fabric.composition.is_some() {
                self.fabric_specs.composition = fabric.composition;
            }
        }

        true
    }
}

/// Payload for creating an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub warehouse: String,
    pub category: String,
    pub gender: Gender,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub color_code: Option<String>,
    #[serde(default)]
    pub fabric_specs: FabricSpecs,
    pub size: String,
    pub design: String,
    pub mrp: f64,
    #[serde(default)]
    pub selling_price: Option<f64>,
    #[serde(default)]
    pub cost_price: Option<f64>,
    pub quantity: i32,
    #[serde(default)]
    pub low_stock_threshold: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl NewItem {
    /// Checks required text fields and numeric ranges. Trims key fields.
    pub fn normalize(mut self) -> Result<Self, String> {
        self.sku = self.sku.trim().to_string();
        self.warehouse = self.warehouse.trim().to_string();

        for (label, value) in [
            ("sku", &self.sku),
            ("name", &self.name),
            ("brand", &self.brand),
            ("warehouse", &self.warehouse),
            ("category", &self.category),
            ("size", &self.size),
            ("design", &self.design),
        ] {
            if value.trim().is_empty() {
                return Err(format!("Field '{label}' is required"));
            }
        }

        check_price("mrp", Some(self.mrp))?;
        check_price("selling_price", self.selling_price)?;
        check_price("cost_price", self.cost_price)?;
        check_count("quantity", Some(self.quantity))?;
        check_count("low_stock_threshold", self.low_stock_threshold)?;

        Ok(self)
    }

    /// Builds a create payload from an import patch. Every field a new item
    /// needs must be present in the patch.
    pub fn from_patch(patch: ItemPatch) -> Result<Self, String> {
        fn need<T>(value: Option<T>, label: &str) -> Result<T, String> {
            value.ok_or_else(|| format!("Field '{label}' is required for a new item"))
        }

        let fabric = patch.fabric_specs.unwrap_or_default();

        Self {
            sku: need(patch.sku, "sku")?,
            name: need(patch.name, "name")?,
            brand: need(patch.brand, "brand")?,
            warehouse: need(patch.warehouse, "warehouse")?,
            category: need(patch.category, "category")?,
            gender: need(patch.gender, "gender")?,
            color: patch.color.unwrap_or_default(),
            color_code: patch.color_code,
            fabric_specs: FabricSpecs {
                material: fabric.material.unwrap_or_default(),
                weight: fabric.weight,
                composition: fabric.composition,
            },
            size: need(patch.size, "size")?,
            design: need(patch.design, "design")?,
            mrp: need(patch.mrp, "mrp")?,
            selling_price: patch.selling_price,
            cost_price: patch.cost_price,
            quantity: need(patch.quantity, "quantity")?,
            low_stock_threshold: patch.low_stock_threshold,
            images: patch.images.unwrap_or_default(),
            status: patch.status.unwrap_or_default(),
        }
        .normalize()
    }
}

/// Partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub warehouse: Option<String>,
    pub category: Option<String>,
    pub gender: Option<Gender>,
    pub color: Option<String>,
    pub color_code: Option<String>,
    pub fabric_specs: Option<FabricPatch>,
    pub size: Option<String>,
    pub design: Option<String>,
    pub mrp: Option<f64>,
    pub selling_price: Option<f64>,
    pub cost_price: Option<f64>,
    pub quantity: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub images: Option<Vec<String>>,
    pub status: Option<ItemStatus>,
}

impl ItemPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sku.is_none()
            && self.name.is_none()
            && self.brand.is_none()
            && self.warehouse.is_none()
            && self.category.is_none()
            && self.gender.is_none()
            && self.color.is_none()
            && self.color_code.is_none()
            && self.fabric_specs.as_ref().is_none_or(FabricPatch::is_empty)
            && self.size.is_none()
            && self.design.is_none()
            && self.mrp.is_none()
            && self.selling_price.is_none()
            && self.cost_price.is_none()
            && self.quantity.is_none()
            && self.low_stock_threshold.is_none()
            && self.images.is_none()
            && self.status.is_none()
    }

    /// True if the patch moves the item to a different `(sku, warehouse)`.
    #[must_use]
    pub fn changes_key(&self, item: &InventoryItem) -> bool {
        self.sku.as_deref().is_some_and(|sku| sku != item.sku)
            || self
                .warehouse
                .as_deref()
                .is_some_and(|warehouse| warehouse != item.warehouse)
    }

    /// Trims key fields and rejects blank keys or negative numbers.
    pub fn normalize(mut self) -> Result<Self, String> {
        for (label, value) in [("sku", &mut self.sku), ("warehouse", &mut self.warehouse)] {
            if let Some(v) = value {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Err(format!("Field '{label}' cannot be empty"));
                }
                *v = trimmed.to_string();
            }
        }

        check_price("mrp", self.mrp)?;
        check_price("selling_price", self.selling_price)?;
        check_price("cost_price", self.cost_price)?;
        check_count("quantity", self.quantity)?;
        check_count("low_stock_threshold", self.low_stock_threshold)?;

        Ok(self)
    }
}

fn check_price(label: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(format!(
            "Field '{label}' must be a non-negative number, got {v}"
        )),
        _ => Ok(()),
    }
}

fn check_count(label: &str, value: Option<i32>) -> Result<(), String> {
    match value {
        Some(v) if v < 0 => Err(format!(
            "Field '{label}' must be a non-negative integer, got {v}"
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn new_item(sku: &str, warehouse: &str) -> NewItem {
        NewItem {
            sku: sku.to_string(),
            name: "Jogger".to_string(),
            brand: "NOM".to_string(),
            warehouse: warehouse.to_string(),
            category: "Bottoms".to_string(),
            gender: Gender::Male,
            color: "Black".to_string(),
            color_code: None,
            fabric_specs: FabricSpecs {
                material: "Cotton".to_string(),
                weight: Some("240 GSM".to_string()),
                composition: None,
            },
            size: "M".to_string(),
            design: "Plain".to_string(),
            mrp: 1299.0,
            selling_price: Some(999.0),
            cost_price: None,
            quantity: 20,
            low_stock_threshold: None,
            images: Vec::new(),
            status: ItemStatus::Active,
        }
    }

    pub fn item(sku: &str, warehouse: &str) -> InventoryItem {
        InventoryItem::from_new(
            new_item(sku, warehouse),
            ItemId::generate(),
            "tester@example.com",
            "2025-01-01T00:00:00+00:00",
            DEFAULT_LOW_STOCK_THRESHOLD,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn apply_merges_only_set_fields() {
        let mut item = item("NOM-1", "W1");
        let changed = item.apply(ItemPatch {
            quantity: Some(3),
            fabric_specs: Some(FabricPatch {
                composition: Some("100% cotton".to_string()),
                ..FabricPatch::default()
            }),
            ..ItemPatch::default()
        });

        assert!(changed);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.name, "Jogger");
        assert_eq!(item.fabric_specs.material, "Cotton");
        assert_eq!(
            item.fabric_specs.composition.as_deref(),
            Some("100% cotton")
        );
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut item = item("NOM-1", "W1");
        let before = item.clone();
        assert!(!item.apply(ItemPatch::default()));
        assert_eq!(item, before);
    }

    #[test]
    fn changes_key_detects_warehouse_move() {
        let item = item("NOM-1", "W1");
        let same = ItemPatch {
            warehouse: Some("W1".to_string()),
            ..ItemPatch::default()
        };
        let moved = ItemPatch {
            warehouse: Some("W2".to_string()),
            ..ItemPatch::default()
        };
        assert!(!same.changes_key(&item));
        assert!(moved.changes_key(&item));
    }

    #[test]
    fn normalize_rejects_negative_quantity_and_blank_sku() {
        let mut bad = new_item("NOM-1", "W1");
        bad.quantity = -1;
        assert!(bad.normalize().is_err());

        let blank = new_item("   ", "W1");
        assert_eq!(
            blank.normalize().unwrap_err(),
            "Field 'sku' is required".to_string()
        );
    }

    #[test]
    fn unit_price_falls_back_to_mrp() {
        let mut item = item("NOM-1", "W1");
        assert!((item.unit_price() - 999.0).abs() < f64::EPSILON);
        item.selling_price = None;
        assert!((item.unit_price() - 1299.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_new_falls_back_to_default_threshold() {
        let built = InventoryItem::from_new(
            new_item("NOM-1", "W1"),
            ItemId::new("1"),
            "a@example.com",
            "2025-01-01T00:00:00+00:00",
            4,
        );
        assert_eq!(built.low_stock_threshold, 4);

        let mut explicit = new_item("NOM-1", "W1");
        explicit.low_stock_threshold = Some(0);
        let built = InventoryItem::from_new(explicit, ItemId::new("1"), "a", "now", 4);
        assert_eq!(built.low_stock_threshold, 0);
    }

    #[test]
    fn from_patch_requires_new_item_fields() {
        let patch = ItemPatch {
            sku: Some("NOM-2".to_string()),
            warehouse: Some("W1".to_string()),
            ..ItemPatch::default()
        };
        let err = NewItem::from_patch(patch).unwrap_err();
        assert!(err.contains("'name'"), "{err}");
    }
}
