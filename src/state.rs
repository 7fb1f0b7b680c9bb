use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, InventoryService, SeaOrmAuthService, SeaOrmInventoryService,
    SeaOrmTemplateService, SeaOrmTransferService, TemplateService, TransferService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub inventory_service: Arc<dyn InventoryService>,

    pub transfer_service: Arc<dyn TransferService>,

    pub template_service: Arc<dyn TemplateService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let security = config.security.clone();
        let config_arc = Arc::new(RwLock::new(config));
        let store_arc = Arc::new(store.clone());

        let inventory_service = Arc::new(SeaOrmInventoryService::new(
            store_arc.clone(),
            config_arc.clone(),
        )) as Arc<dyn InventoryService>;

        let transfer_service = Arc::new(SeaOrmTransferService::new(
            store_arc.clone(),
            config_arc.clone(),
        )) as Arc<dyn TransferService>;

        let template_service =
            Arc::new(SeaOrmTemplateService::new(store_arc)) as Arc<dyn TemplateService>;

        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone(), security)) as Arc<dyn AuthService>;

        Ok(Self {
            config: config_arc,
            store,
            inventory_service,
            transfer_service,
            template_service,
            auth_service,
        })
    }
}
