// src/models/storage.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Grupo de armazenamento ---
// Árvore auto-referente dentro de uma unidade: `parent_id` nulo significa
// raiz. O pai precisa pertencer à mesma unidade e não pode formar ciclo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StorageGroup {
    pub id: Uuid,
    pub org_id: Uuid,
    pub unit_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub alias: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// --- Grupo de células ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CellsGroup {
    pub id: Uuid,
    pub org_id: Uuid,
    pub storage_group_id: Uuid,
    pub name: String,
    pub alias: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// --- Célula ---
// Slot físico endereçável por (linha, nível, posição) dentro do grupo.
// A unicidade da tripla é garantida por constraint no banco.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: Uuid,
    pub org_id: Uuid,
    pub cells_group_id: Uuid,
    pub alias: String,
    pub row: i32,
    pub level: i32,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---
// Patches tipados
// ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageGroupPatch {
    pub name: Option<String>,
    pub alias: Option<String>,
    // Reparentar exige a checagem de aciclicidade no serviço.
    #[serde(default, with = "super::double_option")]
    pub parent_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellsGroupPatch {
    pub name: Option<String>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPatch {
    pub alias: Option<String>,
    pub row: Option<i32>,
    pub level: Option<i32>,
    pub position: Option<i32>,
}

impl StorageGroup {
    pub fn apply_patch(mut self, patch: &StorageGroupPatch) -> Self {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(alias) = &patch.alias {
            self.alias = alias.clone();
        }
        if let Some(parent_id) = &patch.parent_id {
            self.parent_id = *parent_id;
        }
        self
    }
}

impl CellsGroup {
    pub fn apply_patch(mut self, patch: &CellsGroupPatch) -> Self {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(alias) = &patch.alias {
            self.alias = alias.clone();
        }
        self
    }
}

impl Cell {
    pub fn apply_patch(mut self, patch: &CellPatch) -> Self {
        if let Some(alias) = &patch.alias {
            self.alias = alias.clone();
        }
        if let Some(row) = patch.row {
            self.row = row;
        }
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        self
    }
}
