//! Domain service for per-user export templates.

use serde::Deserialize;
use thiserror::Error;

use crate::db::ExportTemplate;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Template '{0}' already exists")]
    Conflict(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TemplateError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TemplateError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[async_trait::async_trait]
pub trait TemplateService: Send + Sync {
    async fn list(&self, owner: &str) -> Result<Vec<ExportTemplate>, TemplateError>;

    /// Saves a template for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Conflict`] if the owner already has a
    /// template with that name, [`TemplateError::Validation`] for an empty
    /// name or an unknown field.
    async fn create(&self, owner: &str, new: NewTemplate) -> Result<ExportTemplate, TemplateError>;

    async fn delete(&self, owner: &str, id: &str) -> Result<(), TemplateError>;
}
