// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Item de catálogo ---
// O item sempre sai do serviço com a coleção completa de variantes (vazia
// quando não há nenhuma, nunca nula).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub variants: Vec<ItemVariant>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// --- Variante de item ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemVariant {
    pub id: Uuid,
    pub item_id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub article: Option<String>,
    pub ean13: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// Entrada de variante vinda do cliente: sem id significa variante nova;
// com id, a variante existente correspondente é atualizada.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemVariantInput {
    pub id: Option<Uuid>,
    pub name: String,
    pub article: Option<String>,
    pub ean13: Option<i64>,
}
