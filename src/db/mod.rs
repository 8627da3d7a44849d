// src/db/mod.rs

pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod item_repo;
pub use item_repo::ItemRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod storage_repo;
pub use storage_repo::StorageRepository;
pub mod tenancy_repo;
pub use tenancy_repo::OrganizationRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
