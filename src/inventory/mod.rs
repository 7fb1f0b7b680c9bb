//! Inventory rules that do not depend on storage: the SKU/warehouse
//! uniqueness gate, list filtering, bulk import reconciliation and
//! aggregate statistics.

pub mod options;
pub mod query;
pub mod reconcile;
pub mod stats;
pub mod uniqueness;

pub use options::{FilterOptions, brand_warehouses, filter_options};
pub use query::{ItemPredicate, ItemQuery, SortKey};
pub use reconcile::{ImportLine, ImportReport, ImportRow, ImportRules, ReconcileTarget, RowError, reconcile};
pub use stats::{InventoryStats, summarize};
pub use uniqueness::{ItemKey, UniquenessViolation, check_unique};
