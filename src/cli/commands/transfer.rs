//! Import and export command handlers

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{ExportFormat, ExportRequest, SeaOrmTransferService, TransferService};

async fn service(config: &Config) -> anyhow::Result<SeaOrmTransferService> {
    let store = Store::new(&config.general.database_path).await?;
    Ok(SeaOrmTransferService::new(
        Arc::new(store),
        Arc::new(RwLock::new(config.clone())),
    ))
}

pub async fn cmd_import(config: &Config, path: &Path, actor: &str) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let report = service(config).await?.import_csv(&text, actor).await?;

    println!(
        "Processed {} rows: {} inserted, {} updated, {} failed",
        report.total_rows, report.inserted, report.updated, report.failed
    );

    for error in &report.errors {
        let sku = error.sku.as_deref().unwrap_or("-");
        println!("  row {:>5}  {:<20} {}", error.row, sku, error.message);
    }

    Ok(())
}

pub async fn cmd_export(
    config: &Config,
    path: &Path,
    format: ExportFormat,
    fields: Vec<String>,
) -> anyhow::Result<()> {
    let request = ExportRequest {
        format,
        fields,
        filters: None,
    };

    let file = service(config).await?.export(&request).await?;

    tokio::fs::write(path, &file.body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Exported {} items to {}", file.rows, path.display());
    Ok(())
}
