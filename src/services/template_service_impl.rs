//! `SeaORM` implementation of the `TemplateService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::db::{ExportTemplate, Store};
use crate::services::template_service::{NewTemplate, TemplateError, TemplateService};
use crate::services::transfer_service::ExportField;

pub struct SeaOrmTemplateService {
    store: Arc<Store>,
}

impl SeaOrmTemplateService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TemplateService for SeaOrmTemplateService {
    async fn list(&self, owner: &str) -> Result<Vec<ExportTemplate>, TemplateError> {
        Ok(self.store.template_repo().list_for(owner).await?)
    }

    async fn create(&self, owner: &str, new: NewTemplate) -> Result<ExportTemplate, TemplateError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(TemplateError::Validation(
                "Template name cannot be empty".to_string(),
            ));
        }
        if new.fields.is_empty() {
            return Err(TemplateError::Validation(
                "Template must select at least one field".to_string(),
            ));
        }
        ExportField::parse_list(&new.fields).map_err(TemplateError::Validation)?;

        let repo = self.store.template_repo();
        if repo.exists(owner, name).await? {
            return Err(TemplateError::Conflict(name.to_string()));
        }

        let template = repo.create(owner, name, &new.fields, new.is_default).await?;
        info!(owner, name, "Saved export template");
        Ok(template)
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<(), TemplateError> {
        if self.store.template_repo().delete(id, owner).await? {
            Ok(())
        } else {
            Err(TemplateError::NotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, is_default: bool) -> NewTemplate {
        NewTemplate {
            name: name.to_string(),
            fields: vec!["sku".to_string(), "quantity".to_string()],
            is_default,
        }
    }

    async fn service() -> SeaOrmTemplateService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        SeaOrmTemplateService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn new_default_replaces_old_default() {
        let svc = service().await;
        svc.create("a@b.co", template("Stock", true)).await.unwrap();
        svc.create("a@b.co", template("Prices", true)).await.unwrap();

        let templates = svc.list("a@b.co").await.unwrap();
        let defaults: Vec<&str> = templates
            .iter()
            .filter(|t| t.is_default)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(defaults, vec!["Prices"]);
        assert_eq!(templates[0].name, "Prices");
    }

    #[tokio::test]
    async fn names_are_unique_per_owner() {
        let svc = service().await;
        svc.create("a@b.co", template("Stock", false)).await.unwrap();
        assert!(matches!(
            svc.create("a@b.co", template("Stock", false)).await,
            Err(TemplateError::Conflict(_))
        ));
        assert!(svc.create("c@d.co", template("Stock", false)).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_field_is_rejected() {
        let svc = service().await;
        let mut bad = template("Bad", false);
        bad.fields.push("barcode".to_string());
        assert!(matches!(
            svc.create("a@b.co", bad).await,
            Err(TemplateError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn only_owner_can_delete() {
        let svc = service().await;
        let saved = svc.create("a@b.co", template("Stock", false)).await.unwrap();

        assert!(matches!(
            svc.delete("c@d.co", &saved.id).await,
            Err(TemplateError::NotFound(_))
        ));
        svc.delete("a@b.co", &saved.id).await.unwrap();
        assert!(svc.list("a@b.co").await.unwrap().is_empty());
    }
}
