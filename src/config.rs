// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        AuditRepository, ItemRepository, OrganizationRepository, RbacRepository, StorageRepository,
        UserRepository,
    },
    services::{
        AccessControlService, AuditService, AuthService, ItemService, OrganizationService,
        StorageService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub org_service: OrganizationService,
    pub storage_service: StorageService,
    pub item_service: ItemService,
    pub audit_service: AuditService,
    pub access_service: AccessControlService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let org_repo = OrganizationRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let storage_repo = StorageRepository::new(db_pool.clone());
        let item_repo = ItemRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        let access = AccessControlService::new(rbac_repo.clone(), org_repo.clone());
        let audit_service = AuditService::new(audit_repo, access.clone());

        let auth_service = AuthService::new(user_repo);
        let org_service = OrganizationService::new(
            org_repo.clone(),
            rbac_repo,
            access.clone(),
            audit_service.clone(),
            db_pool.clone(),
        );
        let storage_service = StorageService::new(
            storage_repo,
            org_repo,
            access.clone(),
            audit_service.clone(),
            db_pool.clone(),
        );
        let item_service = ItemService::new(
            item_repo,
            access.clone(),
            audit_service.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            org_service,
            storage_service,
            item_service,
            audit_service,
            access_service: access,
        })
    }
}
