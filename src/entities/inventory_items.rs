use sea_orm::entity::prelude::*;

/// One stock record. `(sku, warehouse)` is unique, enforced by
/// `idx_inventory_items_sku_warehouse`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub warehouse: String,
    pub category: String,
    pub gender: String,
    pub color: String,
    pub color_code: Option<String>,
    pub fabric_material: String,
    pub fabric_weight: Option<String>,
    pub fabric_composition: Option<String>,
    pub size: String,
    pub design: String,
    pub mrp: f64,
    pub selling_price: Option<f64>,
    pub cost_price: Option<f64>,
    pub quantity: i32,
    pub low_stock_threshold: i32,
    /// JSON array of image URLs.
    pub images: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: String,
    pub last_modified_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
