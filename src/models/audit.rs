// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Ação registrada na trilha de auditoria ---
// Mapeia o CREATE TYPE object_change_action do banco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "object_change_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ObjectChangeAction {
    Create,
    Update,
    Delete,
}

// --- Tipo do objeto alvo ---
// Persistido como inteiro; os códigos são estáveis e fazem parte do
// contrato da trilha (não renumerar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Organization = 1,
    Unit = 2,
    StorageGroup = 3,
    CellsGroup = 4,
    Cell = 5,
    Item = 6,
}

// --- Registro de mudança (append-only) ---
// `seq` é atribuído pelo banco na ordem de commit e define a ordenação
// por objeto. Nunca existe update/delete para estas linhas.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    pub id: Uuid,
    pub seq: i64,
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub action: ObjectChangeAction,
    pub target_object_type: ObjectType,
    pub target_object_id: Uuid,
    pub prechange_state: Option<serde_json::Value>,
    pub postchange_state: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

// Rascunho de um registro, montado pelo serviço que executa a mutação e
// inserido na mesma transação que ela.
#[derive(Debug, Clone)]
pub struct NewObjectChange {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub action: ObjectChangeAction,
    pub target_object_type: ObjectType,
    pub target_object_id: Uuid,
    pub prechange_state: Option<serde_json::Value>,
    pub postchange_state: Option<serde_json::Value>,
}
