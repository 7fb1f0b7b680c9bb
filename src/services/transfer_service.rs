//! Domain service for bulk CSV import and file export of inventory items.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inventory::{ImportReport, ItemQuery};
use crate::models::InventoryItem;

/// Errors specific to import and export.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TransferError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TransferError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<csv::Error> for TransferError {
    fn from(err: csv::Error) -> Self {
        Self::Validation(format!("Malformed CSV: {err}"))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

macro_rules! export_fields {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        /// A column that can be exported.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum ExportField {
            $($variant),+
        }

        impl ExportField {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }
        }

        impl FromStr for ExportField {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($key => Ok(Self::$variant),)+
                    other => Err(format!("Unknown export field: '{other}'")),
                }
            }
        }
    };
}

export_fields! {
    Sku => "sku",
    Name => "name",
    Brand => "brand",
    Warehouse => "warehouse",
    Category => "category",
    Gender => "gender",
    Size => "size",
    Design => "design",
    Color => "color",
    ColorCode => "color_code",
    Mrp => "mrp",
    SellingPrice => "selling_price",
    CostPrice => "cost_price",
    Quantity => "quantity",
    LowStockThreshold => "low_stock_threshold",
    Material => "material",
    Weight => "weight",
    Composition => "composition",
    Status => "status",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
}

impl ExportField {
    /// Parses requested keys in order. An empty list selects every field.
    pub fn parse_list(keys: &[String]) -> Result<Vec<Self>, String> {
        if keys.is_empty() {
            return Ok(Self::ALL.to_vec());
        }
        keys.iter().map(|k| k.parse()).collect()
    }

    /// Cell value as JSON.
    #[must_use]
    pub fn value(self, item: &InventoryItem) -> serde_json::Value {
        use serde_json::Value;

        fn text(s: &str) -> Value {
            Value::String(s.to_string())
        }
        fn opt_text(s: Option<&String>) -> Value {
            s.map_or(Value::Null, |s| text(s))
        }

        match self {
            Self::Sku => text(&item.sku),
            Self::Name => text(&item.name),
            Self::Brand => text(&item.brand),
            Self::Warehouse => text(&item.warehouse),
            Self::Category => text(&item.category),
            Self::Gender => text(item.gender.as_str()),
            Self::Size => text(&item.size),
            Self::Design => text(&item.design),
            Self::Color => text(&item.color),
            Self::ColorCode => opt_text(item.color_code.as_ref()),
            Self::Mrp => Value::from(item.mrp),
            Self::SellingPrice => item.selling_price.map_or(Value::Null, Value::from),
            Self::CostPrice => item.cost_price.map_or(Value::Null, Value::from),
            Self::Quantity => Value::from(item.quantity),
            Self::LowStockThreshold => Value::from(item.low_stock_threshold),
            Self::Material => text(&item.fabric_specs.material),
            Self::Weight => opt_text(item.fabric_specs.weight.as_ref()),
            Self::Composition => opt_text(item.fabric_specs.composition.as_ref()),
            Self::Status => text(item.status.as_str()),
            Self::CreatedAt => text(&item.created_at),
            Self::UpdatedAt => text(&item.updated_at),
        }
    }

    /// Cell value as CSV text. Missing values become empty cells.
    #[must_use]
    pub fn cell(self, item: &InventoryItem) -> String {
        match self.value(item) {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub fields: Vec<String>,
    pub filters: Option<ItemQuery>,
}

/// A rendered export, ready to send as an attachment.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub rows: usize,
}

/// Domain service trait for bulk import and export.
#[async_trait::async_trait]
pub trait TransferService: Send + Sync {
    /// Parses CSV text and reconciles every row into the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Validation`] if the CSV cannot be read or has
    /// more rows than allowed. Row-level problems are reported in the
    /// returned [`ImportReport`] instead.
    async fn import_csv(&self, text: &str, actor: &str) -> Result<ImportReport, TransferError>;

    /// Renders the filtered items with the selected fields.
    async fn export(&self, request: &ExportRequest) -> Result<ExportFile, TransferError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::fixtures::item;

    #[test]
    fn empty_selection_means_all_fields() {
        let fields = ExportField::parse_list(&[]).unwrap();
        assert_eq!(fields.len(), ExportField::ALL.len());
        assert_eq!(fields[0], ExportField::Sku);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = ExportField::parse_list(&["sku".to_string(), "barcode".to_string()]).unwrap_err();
        assert_eq!(err, "Unknown export field: 'barcode'");
    }

    #[test]
    fn cells_render_numbers_and_blanks() {
        let item = item("NOM-1", "W1");
        assert_eq!(ExportField::Mrp.cell(&item), "1299.0");
        assert_eq!(ExportField::Quantity.cell(&item), "20");
        assert_eq!(ExportField::CostPrice.cell(&item), "");
        assert_eq!(ExportField::Gender.cell(&item), "male");
        assert_eq!(ExportField::Weight.cell(&item), "240 GSM");
    }
}
