//! Bulk import: turns spreadsheet rows into insert-or-update decisions.
//!
//! Each row is handled on its own. A bad row is recorded in the
//! [`ImportReport`] and the batch moves on.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::domain::{Gender, ItemId, ItemStatus};
use crate::models::{FabricPatch, InventoryItem, ItemPatch, NewItem};

/// One data row keyed by normalized column name.
pub type ImportRow = BTreeMap<String, String>;

/// Columns required when no override is configured.
pub const DEFAULT_REQUIRED_COLUMNS: &[&str] = &[
    "sku",
    "name",
    "brand",
    "warehouse",
    "category",
    "gender",
    "size",
    "design",
    "mrp",
    "selling_price",
    "quantity",
];

/// Lowercases a header and folds spaces and dashes into underscores, so
/// `"Selling Price"` and `"selling-price"` both become `selling_price`.
#[must_use]
pub fn normalize_column(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// A data row together with the file line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    /// One-based; the header is line 1.
    pub line: u64,
    pub row: ImportRow,
}

/// Reads CSV text with a header line into rows. Line numbers come from the
/// reader, so skipped empty lines and quoted multiline cells are counted.
pub fn parse_csv(text: &str) -> Result<Vec<ImportLine>, csv::Error> {
    let input = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_column).collect();

    reader
        .records()
        .enumerate()
        .map(|(index, record)| -> Result<ImportLine, csv::Error> {
            let record = record?;
            let line = record
                .position()
                .map_or(index as u64 + 2, |position| start_line(input, position));
            let row = headers
                .iter()
                .zip(record.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| (header.clone(), value.to_string()))
                .collect();
            Ok(ImportLine { line, row })
        })
        .collect()
}

/// The reader stamps a record with the position where the previous one
/// ended, which is before any empty lines it then skips.
fn start_line(input: &str, position: &csv::Position) -> u64 {
    let offset = usize::try_from(position.byte()).unwrap_or(input.len());
    let skipped = input
        .as_bytes()
        .get(offset..)
        .unwrap_or_default()
        .iter()
        .take_while(|b| matches!(b, b'\r' | b'\n'))
        .filter(|b| **b == b'\n')
        .count();
    position.line() + skipped as u64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// File line the row starts on; the header is line 1.
    pub row: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub successful: usize,
    pub failed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub errors: Vec<RowError>,
}

/// Import settings taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ImportRules<'a> {
    /// Columns every row must fill.
    pub required: &'a [String],
    /// Threshold for inserted items whose row leaves it blank.
    pub default_low_stock_threshold: i32,
}

/// Storage the reconciler writes through.
#[async_trait]
pub trait ReconcileTarget: Send + Sync {
    /// All variants of a SKU, across warehouses.
    async fn find_by_sku(&self, sku: &str) -> anyhow::Result<Vec<InventoryItem>>;

    async fn insert(&self, item: InventoryItem) -> anyhow::Result<()>;

    async fn update(&self, item: InventoryItem) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Inserted,
    Updated,
}

/// Applies `rows` in order. `actor` is recorded as creator or last
/// modifier of every touched item.
pub async fn reconcile<T>(
    rows: &[ImportLine],
    rules: ImportRules<'_>,
    actor: &str,
    target: &T,
) -> ImportReport
where
    T: ReconcileTarget + ?Sized,
{
    let mut report = ImportReport::default();

    for ImportLine { line, row } in rows {
        let line = *line;
        if is_blank(row) {
            continue;
        }
        report.total_rows += 1;

        match reconcile_row(row, rules, actor, target).await {
            Ok(Outcome::Inserted) => {
                report.successful += 1;
                report.inserted += 1;
            }
            Ok(Outcome::Updated) => {
                report.successful += 1;
                report.updated += 1;
            }
            Err(message) => {
                debug!(row = line, error = %message, "Import row rejected");
                report.failed += 1;
                report.errors.push(RowError {
                    row: line,
                    sku: value(row, "sku").map(str::to_string),
                    message,
                });
            }
        }
    }

    report
}

async fn reconcile_row<T>(
    row: &ImportRow,
    rules: ImportRules<'_>,
    actor: &str,
    target: &T,
) -> Result<Outcome, String>
where
    T: ReconcileTarget + ?Sized,
{
    let missing: Vec<&str> = rules
        .required
        .iter()
        .map(String::as_str)
        .filter(|column| value(row, column).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing required field(s): {}", missing.join(", ")));
    }

    let patch = row_to_patch(row)?.normalize()?;
    let sku = patch
        .sku
        .clone()
        .ok_or_else(|| "Missing required field(s): sku".to_string())?;

    let variants = target
        .find_by_sku(&sku)
        .await
        .map_err(|e| e.to_string())?;

    let now = chrono::Utc::now().to_rfc3339();

    let existing = match patch.warehouse.as_deref() {
        Some(warehouse) => variants.into_iter().find(|i| i.warehouse == warehouse),
        None if variants.len() > 1 => {
            return Err(format!(
                "SKU '{sku}' exists in {} warehouses; specify a warehouse",
                variants.len()
            ));
        }
        None => variants.into_iter().next(),
    };

    if let Some(mut item) = existing {
        item.apply(patch);
        item.updated_at = now;
        item.last_modified_by = actor.to_string();
        target.update(item).await.map_err(|e| e.to_string())?;
        Ok(Outcome::Updated)
    } else {
        let new = NewItem::from_patch(patch)?;
        let item = InventoryItem::from_new(
            new,
            ItemId::generate(),
            actor,
            &now,
            rules.default_low_stock_threshold,
        );
        target.insert(item).await.map_err(|e| e.to_string())?;
        Ok(Outcome::Inserted)
    }
}

fn is_blank(row: &ImportRow) -> bool {
    row.values().all(|v| v.trim().is_empty())
}

/// Non-blank trimmed value of a column.
fn value<'r>(row: &'r ImportRow, column: &str) -> Option<&'r str> {
    row.get(column).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn text(row: &ImportRow, columns: &[&str]) -> Option<String> {
    columns
        .iter()
        .find_map(|column| value(row, column))
        .map(str::to_string)
}

fn price(row: &ImportRow, column: &str) -> Result<Option<f64>, String> {
    value(row, column)
        .map(|raw| {
            raw.replace(',', "")
                .parse::<f64>()
                .map_err(|_| format!("Field '{column}' must be a number, got '{raw}'"))
        })
        .transpose()
}

/// Whole numbers only, though spreadsheet exports like `"5.0"` are accepted.
fn count(row: &ImportRow, column: &str) -> Result<Option<i32>, String> {
    value(row, column)
        .map(|raw| {
            let invalid = || format!("Field '{column}' must be a whole number, got '{raw}'");
            if let Ok(n) = raw.parse::<i32>() {
                return Ok(n);
            }
            let n = raw.parse::<f64>().map_err(|_| invalid())?;
            if n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
                return Err(invalid());
            }
            #[allow(clippy::cast_possible_truncation)]
            let n = n as i32;
            Ok(n)
        })
        .transpose()
}

fn parse_enum<E>(row: &ImportRow, column: &str) -> Result<Option<E>, String>
where
    E: std::str::FromStr,
    E::Err: std::fmt::Display,
{
    value(row, column)
        .map(|raw| raw.parse::<E>().map_err(|e| e.to_string()))
        .transpose()
}

fn row_to_patch(row: &ImportRow) -> Result<ItemPatch, String> {
    let fabric = FabricPatch {
        material: text(row, &["material", "fabric_material"]),
        weight: text(row, &["weight", "fabric_weight"]),
        composition: text(row, &["composition", "fabric_composition"]),
    };

    Ok(ItemPatch {
        sku: text(row, &["sku"]),
        name: text(row, &["name"]),
        brand: text(row, &["brand"]),
        warehouse: text(row, &["warehouse"]),
        category: text(row, &["category"]),
        gender: parse_enum::<Gender>(row, "gender")?,
        color: text(row, &["color"]),
        color_code: text(row, &["color_code"]),
        fabric_specs: (!fabric.is_empty()).then_some(fabric),
        size: text(row, &["size"]),
        design: text(row, &["design"]),
        mrp: price(row, "mrp")?,
        selling_price: price(row, "selling_price")?,
        cost_price: price(row, "cost_price")?,
        quantity: count(row, "quantity")?,
        low_stock_threshold: count(row, "low_stock_threshold")?,
        images: None,
        status: parse_enum::<ItemStatus>(row, "status")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryTarget {
        items: Mutex<Vec<InventoryItem>>,
    }

    #[async_trait]
    impl ReconcileTarget for MemoryTarget {
        async fn find_by_sku(&self, sku: &str) -> anyhow::Result<Vec<InventoryItem>> {
            Ok(self
                .items
                .lock()
                .unwrap()
                .iter()
                .filter(|i| i.sku == sku)
                .cloned()
                .collect())
        }

        async fn insert(&self, item: InventoryItem) -> anyhow::Result<()> {
            self.items.lock().unwrap().push(item);
            Ok(())
        }

        async fn update(&self, item: InventoryItem) -> anyhow::Result<()> {
            let mut items = self.items.lock().unwrap();
            let slot = items
                .iter_mut()
                .find(|i| i.id == item.id)
                .ok_or_else(|| anyhow::anyhow!("item {} not found", item.id))?;
            *slot = item;
            Ok(())
        }
    }

    fn required() -> Vec<String> {
        DEFAULT_REQUIRED_COLUMNS
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn rules(required: &[String]) -> ImportRules<'_> {
        ImportRules {
            required,
            default_low_stock_threshold: 10,
        }
    }

    fn row(sku: &str, warehouse: &str, quantity: &str) -> ImportRow {
        [
            ("sku", sku),
            ("name", "Jogger"),
            ("brand", "NOM"),
            ("warehouse", warehouse),
            ("category", "Bottoms"),
            ("gender", "Male"),
            ("color", "Black"),
            ("material", "Cotton"),
            ("size", "M"),
            ("design", "Plain"),
            ("mrp", "1299"),
            ("selling_price", "999"),
            ("quantity", quantity),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Numbers rows as a file with no blank lines would.
    fn lines(rows: Vec<ImportRow>) -> Vec<ImportLine> {
        rows.into_iter()
            .zip(2..)
            .map(|(row, line)| ImportLine { line, row })
            .collect()
    }

    #[test]
    fn normalize_column_folds_case_spaces_and_dashes() {
        assert_eq!(normalize_column("  Selling Price "), "selling_price");
        assert_eq!(normalize_column("Color-Code"), "color_code");
        assert_eq!(normalize_column("SKU"), "sku");
    }

    #[test]
    fn parse_csv_normalizes_headers_and_trims_values() {
        let rows = parse_csv("SKU, Selling Price ,Quantity\n NOM-1 , 999 ,5\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].row["sku"], "NOM-1");
        assert_eq!(rows[0].row["selling_price"], "999");
        assert_eq!(rows[0].row["quantity"], "5");
    }

    #[test]
    fn parse_csv_keeps_file_line_numbers() {
        let rows = parse_csv("sku,name\nA,x\n\nB,y\nC,\"two\nlines\"\nD,z\n").unwrap();
        let found: Vec<(&str, u64)> = rows
            .iter()
            .map(|r| (r.row["sku"].as_str(), r.line))
            .collect();
        assert_eq!(found, vec![("A", 2), ("B", 4), ("C", 5), ("D", 7)]);

        let crlf = parse_csv("sku\r\nA\r\n\r\n\r\nB\r\n").unwrap();
        assert_eq!(crlf.iter().map(|r| r.line).collect::<Vec<_>>(), vec![2, 5]);
    }

    #[tokio::test]
    async fn errors_point_at_the_file_line_after_gaps() {
        let target = MemoryTarget::default();
        let csv = "sku,name,brand,warehouse,category,gender,size,design,mrp,selling_price,quantity\n\
                   A,Jogger,NOM,W1,Bottoms,Male,M,Plain,1299,999,5\n\
                   \n\
                   B,\"Tee\nlong\",NOM,W1,Tops,Male,M,Plain,499,399,2\n\
                   C,Hoodie,NOM,W1,Tops,Male,M,Plain,1999,1499,many\n";
        let rows = parse_csv(csv).unwrap();

        let report = reconcile(&rows, rules(&required()), "importer@example.com", &target).await;

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.successful, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 6);
        assert_eq!(report.errors[0].sku.as_deref(), Some("C"));
    }

    #[tokio::test]
    async fn one_bad_row_does_not_stop_the_batch() {
        let target = MemoryTarget::default();
        let mut bad = row("B", "W1", "4");
        bad.remove("brand");
        let rows = lines(vec![row("A", "W1", "5"), bad, row("C", "W1", "6"), row("D", "W1", "7")]);

        let report = reconcile(&rows, rules(&required()), "importer@example.com", &target).await;

        assert_eq!(report.total_rows, 4);
        assert_eq!(report.successful, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(report.errors[0].sku.as_deref(), Some("B"));
        assert!(report.errors[0].message.contains("brand"));

        let skus: Vec<String> = target
            .items
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.sku.clone())
            .collect();
        assert_eq!(skus, vec!["A", "C", "D"]);
    }

    #[tokio::test]
    async fn reimport_updates_in_place_and_keeps_other_fields() {
        let target = MemoryTarget::default();
        let mut first = row("A", "W1", "5");
        first.insert("color_code".to_string(), "#000000".to_string());
        reconcile(&lines(vec![first]), rules(&required()), "first@example.com", &target).await;
        let original_id = target.items.lock().unwrap()[0].id.clone();

        let mut second = row("A", "W1", "9");
        second.remove("color");
        let report = reconcile(&lines(vec![second]), rules(&required()), "second@example.com", &target).await;

        assert_eq!(report.updated, 1);
        assert_eq!(report.inserted, 0);

        let items = target.items.lock().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, original_id);
        assert_eq!(items[0].quantity, 9);
        assert_eq!(items[0].color, "Black");
        assert_eq!(items[0].color_code.as_deref(), Some("#000000"));
        assert_eq!(items[0].created_by, "first@example.com");
        assert_eq!(items[0].last_modified_by, "second@example.com");
    }

    #[tokio::test]
    async fn sku_in_new_warehouse_is_inserted_as_variant() {
        let target = MemoryTarget::default();
        let rows = lines(vec![row("A", "W1", "5"), row("A", "W2", "3")]);

        let report = reconcile(&rows, rules(&required()), "importer@example.com", &target).await;

        assert_eq!(report.inserted, 2);
        assert_eq!(target.items.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn coercion_errors_are_reported_per_row() {
        let target = MemoryTarget::default();
        let rows = lines(vec![
            row("A", "W1", "5.0"),
            row("B", "W1", "five"),
            row("C", "W1", "2.5"),
        ]);

        let report = reconcile(&rows, rules(&required()), "importer@example.com", &target).await;

        assert_eq!(report.successful, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(
            report.errors.iter().map(|e| e.row).collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert_eq!(target.items.lock().unwrap()[0].quantity, 5);
    }

    #[tokio::test]
    async fn invalid_gender_is_rejected() {
        let target = MemoryTarget::default();
        let mut bad = row("A", "W1", "5");
        bad.insert("gender".to_string(), "unisex".to_string());

        let report = reconcile(&lines(vec![bad]), rules(&required()), "importer@example.com", &target).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].message, "invalid gender: 'unisex'");
    }

    #[tokio::test]
    async fn blank_rows_are_skipped_but_keep_line_numbers() {
        let target = MemoryTarget::default();
        let blank: ImportRow = [("sku".to_string(), "  ".to_string())].into_iter().collect();
        let mut bad = row("B", "W1", "1");
        bad.remove("mrp");
        let rows = lines(vec![row("A", "W1", "5"), blank, bad]);

        let report = reconcile(&rows, rules(&required()), "importer@example.com", &target).await;

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.errors[0].row, 4);
    }
}
