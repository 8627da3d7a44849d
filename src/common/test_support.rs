// src/common/test_support.rs

// Infraestrutura compartilhada pelos testes que exigem um Postgres real.
// Quando DATABASE_URL não está definida, `try_backend` devolve None e os
// testes retornam cedo sem falhar.

use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::db::{
    AuditRepository, ItemRepository, OrganizationRepository, RbacRepository, StorageRepository,
    UserRepository,
};
use crate::models::auth::User;
use crate::services::{
    AccessControlService, AuditService, ItemService, OrganizationService, StorageService,
};

pub struct TestBackend {
    pub pool: PgPool,
    pub users: UserRepository,
    pub item_repo: ItemRepository,
    pub access: AccessControlService,
    pub audit: AuditService,
    pub orgs: OrganizationService,
    pub storage: StorageService,
    pub items: ItemService,
}

pub async fn try_backend() -> Option<TestBackend> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("falha ao conectar no banco de testes");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("falha ao aplicar as migrações");

    let users = UserRepository::new(pool.clone());
    let org_repo = OrganizationRepository::new(pool.clone());
    let rbac_repo = RbacRepository::new(pool.clone());
    let storage_repo = StorageRepository::new(pool.clone());
    let item_repo = ItemRepository::new(pool.clone());
    let audit_repo = AuditRepository::new(pool.clone());

    let access = AccessControlService::new(rbac_repo.clone(), org_repo.clone());
    let audit = AuditService::new(audit_repo, access.clone());
    let orgs = OrganizationService::new(
        org_repo.clone(),
        rbac_repo,
        access.clone(),
        audit.clone(),
        pool.clone(),
    );
    let storage = StorageService::new(
        storage_repo,
        org_repo,
        access.clone(),
        audit.clone(),
        pool.clone(),
    );
    let items = ItemService::new(item_repo.clone(), access.clone(), audit.clone(), pool.clone());

    Some(TestBackend {
        pool,
        users,
        item_repo,
        access,
        audit,
        orgs,
        storage,
        items,
    })
}

pub async fn seed_user(backend: &TestBackend) -> User {
    let email = format!("{}@exemplo.com", Uuid::new_v4());
    backend
        .users
        .create_user(backend.users.pool(), &email, "Ana", "Souza", None, None)
        .await
        .expect("falha ao criar usuário de teste")
}

// Subdomínios e aliases são únicos por organização; o sufixo aleatório
// permite rodar a suíte repetidas vezes no mesmo banco.
pub fn unique_slug(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}
