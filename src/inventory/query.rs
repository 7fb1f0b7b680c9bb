//! Translation of optional list filters into an item predicate.
//!
//! The same [`ItemPredicate`] can be evaluated against in-memory items or
//! turned into a `SeaORM` [`Condition`] for the store.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::domain::{Gender, ItemStatus, SortOrder, UnknownVariant};
use crate::entities::inventory_items::Column;
use crate::models::InventoryItem;

/// Query parameters accepted by the item list endpoint.
///
/// Empty strings are treated as absent so that `?category=` or `?gender=`
/// behaves like no filter at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemQuery {
    pub category: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub gender: Option<Gender>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub warehouse: Option<String>,
    pub brand: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub status: Option<ItemStatus>,
    #[serde(deserialize_with = "blank_as_none")]
    pub min_price: Option<f64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub design: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub sort_by: Option<SortKey>,
    #[serde(deserialize_with = "blank_as_none")]
    pub sort_order: Option<SortOrder>,
}

/// Query strings carry every value as text while JSON bodies carry typed
/// values; both are accepted and blank text reads as `None`.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Param<V> {
        Text(String),
        Value(V),
    }

    match Option::<Param<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Param::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Param::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(<D::Error as de::Error>::custom),
        Some(Param::Value(value)) => Ok(Some(value)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Sku,
    Name,
    Quantity,
    Mrp,
    SellingPrice,
}

impl FromStr for SortKey {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "sku" => Ok(Self::Sku),
            "name" => Ok(Self::Name),
            "quantity" => Ok(Self::Quantity),
            "mrp" => Ok(Self::Mrp),
            "selling_price" => Ok(Self::SellingPrice),
            _ => Err(UnknownVariant {
                kind: "sort_by",
                value: s.to_string(),
            }),
        }
    }
}

impl SortKey {
    #[must_use]
    pub const fn column(self) -> Column {
        match self {
            Self::CreatedAt => Column::CreatedAt,
            Self::UpdatedAt => Column::UpdatedAt,
            Self::Sku => Column::Sku,
            Self::Name => Column::Name,
            Self::Quantity => Column::Quantity,
            Self::Mrp => Column::Mrp,
            Self::SellingPrice => Column::SellingPrice,
        }
    }
}

/// Item fields matched by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactField {
    Category,
    Gender,
    Color,
    Size,
    Warehouse,
    Brand,
    Status,
}

impl ExactField {
    const fn column(self) -> Column {
        match self {
            Self::Category => Column::Category,
            Self::Gender => Column::Gender,
            Self::Color => Column::Color,
            Self::Size => Column::Size,
            Self::Warehouse => Column::Warehouse,
            Self::Brand => Column::Brand,
            Self::Status => Column::Status,
        }
    }

    fn value_of(self, item: &InventoryItem) -> &str {
        match self {
            Self::Category => &item.category,
            Self::Gender => item.gender.as_str(),
            Self::Color => &item.color,
            Self::Size => &item.size,
            Self::Warehouse => &item.warehouse,
            Self::Brand => &item.brand,
            Self::Status => item.status.as_str(),
        }
    }
}

/// Item fields matched by case-insensitive substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Sku,
    Name,
    Design,
}

impl TextField {
    const fn column(self) -> Column {
        match self {
            Self::Sku => Column::Sku,
            Self::Name => Column::Name,
            Self::Design => Column::Design,
        }
    }

    fn value_of(self, item: &InventoryItem) -> &str {
        match self {
            Self::Sku => &item.sku,
            Self::Name => &item.name,
            Self::Design => &item.design,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Equals(ExactField, String),
    /// Matches if any of the fields contains the needle.
    Contains(Vec<TextField>, String),
    /// Matches if either `mrp` or `selling_price` lies in range.
    PriceRange { min: Option<f64>, max: Option<f64> },
}

impl Clause {
    fn matches(&self, item: &InventoryItem) -> bool {
        match self {
            Self::Equals(field, value) => field.value_of(item) == value,
            Self::Contains(fields, needle) => fields
                .iter()
                .any(|f| contains_folded(f.value_of(item), needle)),
            Self::PriceRange { min, max } => {
                let in_range = |price: f64| {
                    min.is_none_or(|min| price >= min) && max.is_none_or(|max| price <= max)
                };
                in_range(item.mrp) || item.selling_price.is_some_and(in_range)
            }
        }
    }

    /// Whether the SQL condition selects exactly the items `matches` accepts.
    fn exact_in_sql(&self) -> bool {
        match self {
            Self::Contains(_, needle) => needle.is_ascii(),
            Self::Equals(..) | Self::PriceRange { .. } => true,
        }
    }

    fn to_condition(&self) -> Condition {
        match self {
            Self::Equals(field, value) => Condition::all().add(field.column().eq(value.as_str())),
            // Left to `matches` after the query.
            Self::Contains(_, needle) if !needle.is_ascii() => Condition::all(),
            Self::Contains(fields, needle) => fields.iter().fold(Condition::any(), |cond, f| {
                cond.add(contains_ignore_case(f.column(), needle))
            }),
            Self::PriceRange { min, max } => Condition::any()
                .add(price_range(Column::Mrp, *min, *max))
                .add(price_range(Column::SellingPrice, *min, *max)),
        }
    }
}

/// Conjunction of clauses. An empty predicate matches every item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPredicate {
    pub clauses: Vec<Clause>,
}

impl ItemPredicate {
    #[must_use]
    pub fn matches(&self, item: &InventoryItem) -> bool {
        self.clauses.iter().all(|c| c.matches(item))
    }

    /// False when some clause is only narrowed in SQL and the rows must be
    /// filtered again with [`Self::matches`].
    #[must_use]
    pub fn exact_in_sql(&self) -> bool {
        self.clauses.iter().all(Clause::exact_in_sql)
    }

    #[must_use]
    pub fn to_condition(&self) -> Condition {
        self.clauses
            .iter()
            .fold(Condition::all(), |cond, c| cond.add(c.to_condition()))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ItemQuery {
    /// Rejects contradictory or out-of-range price bounds.
    pub fn validate(&self) -> Result<(), String> {
        for (label, bound) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(v) = bound
                && (!v.is_finite() || v < 0.0)
            {
                return Err(format!("{label} must be a non-negative number"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(format!(
                "min_price ({min}) cannot be greater than max_price ({max})"
            ));
        }
        Ok(())
    }

    /// Builds the predicate. A field-specific text filter (`sku`, then
    /// `name`, then `design`) takes precedence over `search`; only the first
    /// one present is applied.
    #[must_use]
    pub fn predicate(&self) -> ItemPredicate {
        let mut clauses = Vec::new();

        let exact = [
            (ExactField::Category, non_empty(self.category.as_ref()).map(str::to_string)),
            (ExactField::Gender, self.gender.map(|g| g.as_str().to_string())),
            (ExactField::Color, non_empty(self.color.as_ref()).map(str::to_string)),
            (ExactField::Size, non_empty(self.size.as_ref()).map(str::to_string)),
            (ExactField::Warehouse, non_empty(self.warehouse.as_ref()).map(str::to_string)),
            (ExactField::Brand, non_empty(self.brand.as_ref()).map(str::to_string)),
            (ExactField::Status, self.status.map(|s| s.as_str().to_string())),
        ];
        for (field, value) in exact {
            if let Some(value) = value {
                clauses.push(Clause::Equals(field, value));
            }
        }

        if self.min_price.is_some() || self.max_price.is_some() {
            clauses.push(Clause::PriceRange {
                min: self.min_price,
                max: self.max_price,
            });
        }

        let text = [
            (TextField::Sku, self.sku.as_ref()),
            (TextField::Name, self.name.as_ref()),
            (TextField::Design, self.design.as_ref()),
        ]
        .into_iter()
        .find_map(|(field, value)| non_empty(value).map(|v| (vec![field], v)))
        .or_else(|| {
            non_empty(self.search.as_ref())
                .map(|v| (vec![TextField::Sku, TextField::Name, TextField::Design], v))
        });

        if let Some((fields, needle)) = text {
            clauses.push(Clause::Contains(fields, needle.to_string()));
        }

        ItemPredicate { clauses }
    }

    #[must_use]
    pub fn sort(&self) -> (SortKey, SortOrder) {
        (
            self.sort_by.unwrap_or_default(),
            self.sort_order.unwrap_or_default(),
        )
    }
}

/// SQLite's `lower()` folds ASCII only, so ASCII needles are compared the
/// same way here. Other needles get full Unicode folding and are never sent
/// to SQL.
fn contains_folded(haystack: &str, needle: &str) -> bool {
    if needle.is_ascii() {
        haystack
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

const LIKE_ESCAPE: char = '!';

/// `lower(col) LIKE '%needle%'` with LIKE metacharacters in the needle
/// escaped.
fn contains_ignore_case(column: Column, needle: &str) -> SimpleExpr {
    let mut escaped = String::with_capacity(needle.len() + 2);
    for c in needle.to_ascii_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }

    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(format!("%{escaped}%")).escape(LIKE_ESCAPE))
}

fn price_range(column: Column, min: Option<f64>, max: Option<f64>) -> Condition {
    let mut cond = Condition::all();
    if let Some(min) = min {
        cond = cond.add(column.gte(min));
    }
    if let Some(max) = max {
        cond = cond.add(column.lte(max));
    }
    cond
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::fixtures::item;

    fn catalogue() -> Vec<InventoryItem> {
        let mut jogger = item("NOM-JOGGER-M", "W1");
        jogger.design = "Striped".to_string();

        let mut tee = item("TEE-001", "W1");
        tee.name = "Nomad Tee".to_string();
        tee.category = "Tops".to_string();
        tee.mrp = 499.0;
        tee.selling_price = Some(399.0);

        let mut hoodie = item("HOOD-01", "W2");
        hoodie.name = "Hoodie".to_string();
        hoodie.design = "nomad print".to_string();
        hoodie.gender = Gender::Female;
        hoodie.status = ItemStatus::Discontinued;

        vec![jogger, tee, hoodie]
    }

    fn select<'a>(query: &ItemQuery, items: &'a [InventoryItem]) -> Vec<&'a str> {
        let predicate = query.predicate();
        items
            .iter()
            .filter(|i| predicate.matches(i))
            .map(|i| i.sku.as_str())
            .collect()
    }

    #[test]
    fn empty_query_matches_everything() {
        let items = catalogue();
        assert_eq!(select(&ItemQuery::default(), &items).len(), 3);
        assert!(ItemQuery::default().predicate().clauses.is_empty());
    }

    #[test]
    fn search_spans_sku_name_and_design_case_insensitively() {
        let items = catalogue();
        let query = ItemQuery {
            search: Some("NOM".to_string()),
            ..ItemQuery::default()
        };
        assert_eq!(select(&query, &items), vec!["NOM-JOGGER-M", "TEE-001", "HOOD-01"]);
    }

    #[test]
    fn exact_field_filter_ignores_general_search() {
        let items = catalogue();
        let query = ItemQuery {
            sku: Some("NOM".to_string()),
            search: Some("hoodie".to_string()),
            ..ItemQuery::default()
        };

        assert_eq!(
            query.predicate().clauses,
            vec![Clause::Contains(vec![TextField::Sku], "NOM".to_string())]
        );
        assert_eq!(select(&query, &items), vec!["NOM-JOGGER-M"]);
    }

    #[test]
    fn sku_filter_wins_over_name_and_design() {
        let query = ItemQuery {
            sku: Some("a".to_string()),
            name: Some("b".to_string()),
            design: Some("c".to_string()),
            ..ItemQuery::default()
        };
        assert_eq!(
            query.predicate().clauses,
            vec![Clause::Contains(vec![TextField::Sku], "a".to_string())]
        );
    }

    #[test]
    fn blank_text_filters_are_ignored() {
        let items = catalogue();
        let query = ItemQuery {
            sku: Some("  ".to_string()),
            search: Some("hood".to_string()),
            category: Some(String::new()),
            ..ItemQuery::default()
        };
        assert_eq!(select(&query, &items), vec!["HOOD-01"]);
    }

    #[test]
    fn price_range_matches_either_price_field() {
        let items = catalogue();
        // Jogger: mrp 1299 / selling 999. Tee: 499 / 399.
        let query = ItemQuery {
            min_price: Some(900.0),
            max_price: Some(1000.0),
            ..ItemQuery::default()
        };
        assert_eq!(select(&query, &items), vec!["NOM-JOGGER-M", "HOOD-01"]);

        let query = ItemQuery {
            max_price: Some(450.0),
            ..ItemQuery::default()
        };
        assert_eq!(select(&query, &items), vec!["TEE-001"]);
    }

    #[test]
    fn exact_filters_combine_with_and() {
        let items = catalogue();
        let query = ItemQuery {
            warehouse: Some("W1".to_string()),
            category: Some("Tops".to_string()),
            ..ItemQuery::default()
        };
        assert_eq!(select(&query, &items), vec!["TEE-001"]);

        let query = ItemQuery {
            gender: Some(Gender::Female),
            status: Some(ItemStatus::Active),
            ..ItemQuery::default()
        };
        assert!(select(&query, &items).is_empty());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let query = ItemQuery {
            min_price: Some(10.0),
            max_price: Some(5.0),
            ..ItemQuery::default()
        };
        assert!(query.validate().is_err());
        assert!(ItemQuery::default().validate().is_ok());
    }

    #[test]
    fn sort_defaults_to_newest_first() {
        assert_eq!(
            ItemQuery::default().sort(),
            (SortKey::CreatedAt, SortOrder::Desc)
        );
    }

    #[test]
    fn query_string_deserializes() {
        let query: ItemQuery =
            serde_json::from_str(r#"{"sort_by":"selling_price","sort_order":"asc","gender":"male"}"#)
                .unwrap();
        assert_eq!(query.sort(), (SortKey::SellingPrice, SortOrder::Asc));
        assert_eq!(query.gender, Some(Gender::Male));
    }

    #[test]
    fn only_ascii_search_runs_in_sql() {
        let ascii = ItemQuery {
            search: Some("tee".to_string()),
            ..ItemQuery::default()
        };
        assert!(ascii.predicate().exact_in_sql());

        let accented = ItemQuery {
            search: Some("été".to_string()),
            category: Some("Tops".to_string()),
            ..ItemQuery::default()
        };
        assert!(!accented.predicate().exact_in_sql());

        let mut summer = item("SUM-1", "W1");
        summer.name = "ÉTÉ Linen".to_string();
        assert!(accented.predicate().clauses[1].matches(&summer));
    }

    #[test]
    fn blank_typed_params_read_as_absent() {
        let query: ItemQuery = serde_json::from_str(
            r#"{"gender":"","status":" ","sort_by":"","sort_order":"","min_price":"","max_price":"350"}"#,
        )
        .unwrap();
        assert_eq!(query.gender, None);
        assert_eq!(query.status, None);
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, Some(350.0));
        assert_eq!(query.sort(), (SortKey::CreatedAt, SortOrder::Desc));

        let typed: ItemQuery =
            serde_json::from_str(r#"{"min_price":200,"status":null,"sort_order":"Descending"}"#).unwrap();
        assert_eq!(typed.min_price, Some(200.0));
        assert_eq!(typed.status, None);
        assert_eq!(typed.sort_order, Some(SortOrder::Desc));

        assert!(serde_json::from_str::<ItemQuery>(r#"{"gender":"unisex"}"#).is_err());
        assert!(serde_json::from_str::<ItemQuery>(r#"{"min_price":"cheap"}"#).is_err());
    }
}
