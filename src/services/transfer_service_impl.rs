//! `SeaORM` implementation of the `TransferService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::inventory::reconcile::{self, ImportReport, ImportRules};
use crate::inventory::ItemQuery;
use crate::models::InventoryItem;
use crate::services::transfer_service::{
    ExportField, ExportFile, ExportFormat, ExportRequest, TransferError, TransferService,
};

pub struct SeaOrmTransferService {
    store: Arc<Store>,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmTransferService {
    #[must_use]
    pub const fn new(store: Arc<Store>, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }
}

fn render_csv(items: &[InventoryItem], fields: &[ExportField]) -> Result<Vec<u8>, TransferError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields.iter().map(|f| f.key()))?;
    for item in items {
        writer.write_record(fields.iter().map(|f| f.cell(item)))?;
    }
    writer
        .into_inner()
        .map_err(|e| TransferError::Internal(format!("Failed to flush CSV: {e}")))
}

fn render_json(items: &[InventoryItem], fields: &[ExportField]) -> Result<Vec<u8>, TransferError> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = items
        .iter()
        .map(|item| {
            fields
                .iter()
                .map(|f| (f.key().to_string(), f.value(item)))
                .collect()
        })
        .collect();

    serde_json::to_vec_pretty(&rows)
        .map_err(|e| TransferError::Internal(format!("Failed to encode JSON: {e}")))
}

#[async_trait]
impl TransferService for SeaOrmTransferService {
    async fn import_csv(&self, text: &str, actor: &str) -> Result<ImportReport, TransferError> {
        let rows = reconcile::parse_csv(text)?;

        let (required, default_threshold, max_rows) = {
            let config = self.config.read().await;
            (
                config.inventory.required_import_columns.clone(),
                config.inventory.default_low_stock_threshold,
                config.inventory.max_import_rows,
            )
        };

        if rows.is_empty() {
            return Err(TransferError::Validation(
                "Import file contains no data rows".to_string(),
            ));
        }
        if rows.len() > max_rows {
            return Err(TransferError::Validation(format!(
                "Import has {} rows; the limit is {max_rows}",
                rows.len()
            )));
        }

        let rules = ImportRules {
            required: &required,
            default_low_stock_threshold: default_threshold,
        };
        let target = self.store.inventory_repo();
        let report = reconcile::reconcile(&rows, rules, actor, &target).await;

        for (outcome, count) in [
            ("inserted", report.inserted),
            ("updated", report.updated),
            ("failed", report.failed),
        ] {
            metrics::counter!("inventory_import_rows_total", "outcome" => outcome)
                .increment(count as u64);
        }

        info!(
            actor,
            total = report.total_rows,
            inserted = report.inserted,
            updated = report.updated,
            failed = report.failed,
            "Import finished"
        );

        Ok(report)
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportFile, TransferError> {
        let fields = ExportField::parse_list(&request.fields).map_err(TransferError::Validation)?;

        let query = request.filters.clone().unwrap_or_default();
        query.validate().map_err(TransferError::Validation)?;

        let items = self
            .store
            .list_items(&query.predicate(), query.sort(), None)
            .await?;

        let body = match request.format {
            ExportFormat::Csv => render_csv(&items, &fields)?,
            ExportFormat::Json => render_json(&items, &fields)?,
        };

        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        Ok(ExportFile {
            filename: format!("inventory_export_{stamp}.{}", request.format.extension()),
            content_type: request.format.content_type(),
            body,
            rows: items.len(),
        })
    }
}
