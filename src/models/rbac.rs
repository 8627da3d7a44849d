// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Cargo (role) ---
// Cargos são globais e pré-populados pela migração: owner, admin, manager
// e worker. O vínculo com (usuário, organização) é o RoleBinding.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub display_name: String,
}

// Ids fixos dos cargos semeados (espelham a migração inicial).
pub const ROLE_OWNER: i32 = 1;
pub const ROLE_ADMIN: i32 = 2;
pub const ROLE_MANAGER: i32 = 3;
pub const ROLE_WORKER: i32 = 4;

// --- Vínculo usuário <-> organização <-> cargo ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    pub id: Uuid,
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role_id: i32,
    pub created_at: DateTime<Utc>,
}

// --- Permissão de um cargo ---
// Slugs no formato "modulo:acao", ex.: "storage:write".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    pub role_id: i32,
    pub permission: String,
}

// Slugs de permissão conhecidos pelo sistema.
pub mod permissions {
    pub const ORG_OWNER: &str = "org:owner";
    pub const STORAGE_READ: &str = "storage:read";
    pub const STORAGE_WRITE: &str = "storage:write";
    pub const CATALOG_READ: &str = "catalog:read";
    pub const CATALOG_WRITE: &str = "catalog:write";
    pub const AUDIT_READ: &str = "audit:read";
}
