use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;

use crate::entities::{export_templates, prelude::*};

/// A saved export field selection, owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTemplate {
    pub id: String,
    pub name: String,
    pub fields: Vec<String>,
    pub is_default: bool,
    pub created_by: String,
    pub created_at: String,
}

impl TryFrom<export_templates::Model> for ExportTemplate {
    type Error = anyhow::Error;

    fn try_from(m: export_templates::Model) -> Result<Self> {
        Ok(Self {
            fields: serde_json::from_str(&m.fields)
                .with_context(|| format!("Corrupt fields column for template {}", m.id))?,
            id: m.id,
            name: m.name,
            is_default: m.is_default,
            created_by: m.created_by,
            created_at: m.created_at,
        })
    }
}

pub struct ExportTemplateRepository {
    conn: DatabaseConnection,
}

impl ExportTemplateRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Templates owned by `owner`, default first, then by name.
    pub async fn list_for(&self, owner: &str) -> Result<Vec<ExportTemplate>> {
        ExportTemplates::find()
            .filter(export_templates::Column::CreatedBy.eq(owner))
            .order_by_desc(export_templates::Column::IsDefault)
            .order_by_asc(export_templates::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list export templates")?
            .into_iter()
            .map(ExportTemplate::try_from)
            .collect()
    }

    pub async fn exists(&self, owner: &str, name: &str) -> Result<bool> {
        let found = ExportTemplates::find()
            .filter(export_templates::Column::CreatedBy.eq(owner))
            .filter(export_templates::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query export template")?;

        Ok(found.is_some())
    }

    /// Saves a template. A new default clears the owner's previous default.
    pub async fn create(
        &self,
        owner: &str,
        name: &str,
        fields: &[String],
        is_default: bool,
    ) -> Result<ExportTemplate> {
        let txn = self.conn.begin().await?;

        if is_default {
            ExportTemplates::update_many()
                .col_expr(
                    export_templates::Column::IsDefault,
                    sea_orm::sea_query::Expr::value(false),
                )
                .filter(export_templates::Column::CreatedBy.eq(owner))
                .exec(&txn)
                .await
                .context("Failed to clear default export template")?;
        }

        let model = export_templates::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            fields: Set(serde_json::to_string(fields)?),
            is_default: Set(is_default),
            created_by: Set(owner.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&txn)
        .await
        .context("Failed to insert export template")?;

        txn.commit().await?;

        ExportTemplate::try_from(model)
    }

    /// Deletes a template if `owner` owns it.
    pub async fn delete(&self, id: &str, owner: &str) -> Result<bool> {
        let result = ExportTemplates::delete_many()
            .filter(export_templates::Column::Id.eq(id))
            .filter(export_templates::Column::CreatedBy.eq(owner))
            .exec(&self.conn)
            .await
            .context("Failed to delete export template")?;

        Ok(result.rows_affected > 0)
    }
}
