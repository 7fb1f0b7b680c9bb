pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod inventory_service;
pub mod inventory_service_impl;
pub use inventory_service::{InventoryError, InventoryService};
pub use inventory_service_impl::SeaOrmInventoryService;

pub mod transfer_service;
pub mod transfer_service_impl;
pub use transfer_service::{
    ExportField, ExportFile, ExportFormat, ExportRequest, TransferError, TransferService,
};
pub use transfer_service_impl::SeaOrmTransferService;

pub mod template_service;
pub mod template_service_impl;
pub use template_service::{NewTemplate, TemplateError, TemplateService};
pub use template_service_impl::SeaOrmTemplateService;
