pub mod prelude;

pub mod export_templates;
pub mod inventory_items;
pub mod users;
