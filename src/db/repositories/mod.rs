pub mod export_template;
pub mod inventory;
pub mod user;
