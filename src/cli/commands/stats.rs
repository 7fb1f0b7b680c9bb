//! Inventory statistics command handler

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{InventoryService, SeaOrmInventoryService};

pub async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let service =
        SeaOrmInventoryService::new(Arc::new(store), Arc::new(RwLock::new(config.clone())));

    let stats = service.stats().await?;

    println!("Inventory Summary");
    println!("{:-<40}", "");
    println!("{:<22}{:>18}", "Items", stats.total_items);
    println!("{:<22}{:>18}", "Units in stock", stats.total_quantity);
    println!("{:<22}{:>18}", "Low stock items", stats.low_stock_items);
    println!("{:<22}{:>18}", "Categories", stats.categories_count);
    println!("{:<22}{:>18.2}", "Stock value", stats.total_value);

    Ok(())
}
