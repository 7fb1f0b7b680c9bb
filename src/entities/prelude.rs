pub use super::export_templates::Entity as ExportTemplates;
pub use super::inventory_items::Entity as InventoryItems;
pub use super::users::Entity as Users;
