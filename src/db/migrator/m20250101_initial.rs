use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password;
use crate::entities::prelude::*;
use crate::entities::{inventory_items, users};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default API key of the seeded admin (regenerate after first login)
pub const DEFAULT_API_KEY: &str = "stockyard_default_api_key_please_regenerate";

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

const UNIQUE_SKU_WAREHOUSE: &str = "idx_inventory_items_sku_warehouse";

fn hash_default_password() -> Result<String, DbErr> {
    hash_password("password", &SecurityConfig::default())
        .map_err(|e| DbErr::Custom(format!("Failed to hash default password: {e}")))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(InventoryItems)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One row per SKU per warehouse
        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_SKU_WAREHOUSE)
                    .table(InventoryItems)
                    .col(inventory_items::Column::Sku)
                    .col(inventory_items::Column::Warehouse)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_items_created_at")
                    .table(InventoryItems)
                    .col(inventory_items::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password()?;

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                users::Column::Id,
                users::Column::Email,
                users::Column::PasswordHash,
                users::Column::Role,
                users::Column::ApiKey,
                users::Column::CreatedAt,
                users::Column::UpdatedAt,
            ])
            .values_panic([
                uuid::Uuid::new_v4().to_string().into(),
                DEFAULT_ADMIN_EMAIL.into(),
                password_hash.into(),
                "admin".into(),
                DEFAULT_API_KEY.into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryItems).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
