use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{ItemId, Role, SortOrder};
use crate::inventory::query::{ItemPredicate, SortKey};
use crate::models::InventoryItem;

pub mod migrator;
pub mod repositories;

pub use repositories::export_template::ExportTemplate;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `sqlite::memory:` is its own database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);
        if !in_memory {
            opt.max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    // ========== Inventory Repository Methods ==========

    #[must_use]
    pub fn inventory_repo(&self) -> repositories::inventory::InventoryRepository {
        repositories::inventory::InventoryRepository::new(self.conn.clone())
    }

    pub async fn get_item(&self, id: &ItemId) -> Result<Option<InventoryItem>> {
        self.inventory_repo().get(id).await
    }

    pub async fn list_items(
        &self,
        predicate: &ItemPredicate,
        sort: (SortKey, SortOrder),
        limit: Option<u64>,
    ) -> Result<Vec<InventoryItem>> {
        self.inventory_repo().list(predicate, sort, limit).await
    }

    pub async fn list_all_items(&self) -> Result<Vec<InventoryItem>> {
        self.inventory_repo().list_all().await
    }

    pub async fn find_items_by_sku(&self, sku: &str) -> Result<Vec<InventoryItem>> {
        self.inventory_repo().find_by_sku(sku).await
    }

    pub async fn insert_item(&self, item: &InventoryItem) -> Result<()> {
        self.inventory_repo().insert(item).await
    }

    pub async fn update_item(&self, item: &InventoryItem) -> Result<()> {
        self.inventory_repo().update(item).await
    }

    pub async fn delete_item(&self, id: &ItemId) -> Result<bool> {
        self.inventory_repo().delete(id).await
    }

    pub async fn count_items(&self) -> Result<u64> {
        self.inventory_repo().count().await
    }

    // ========== Export Template Repository Methods ==========

    #[must_use]
    pub fn template_repo(&self) -> repositories::export_template::ExportTemplateRepository {
        repositories::export_template::ExportTemplateRepository::new(self.conn.clone())
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
        config: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo().create(email, password, role, config).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_password(
        &self,
        email: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(email, new_password, config)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_user_api_key(&self, email: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(email).await
    }
}
