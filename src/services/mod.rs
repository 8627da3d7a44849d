// src/services/mod.rs

pub mod access_control;
pub mod audit_service;
pub mod auth_service;
pub mod catalog_service;
pub mod storage_service;
pub mod tenancy_service;
pub mod validation;

pub use access_control::AccessControlService;
pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use catalog_service::ItemService;
pub use storage_service::StorageService;
pub use tenancy_service::OrganizationService;
