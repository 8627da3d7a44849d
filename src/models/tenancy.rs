// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Organização ---
// Raiz de todos os dados do tenant. Toda entidade abaixo dela carrega um
// `org_id` e toda leitura "ativa" filtra `deleted_at IS NULL`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub subdomain: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// --- Unidade (site físico de uma organização) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUnit {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub alias: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---
// Patches tipados (atualização parcial)
// ---
// Só os campos presentes são aplicados. Campos de identidade (id, org_id)
// nunca entram aqui.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub subdomain: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUnitPatch {
    pub name: Option<String>,
    pub alias: Option<String>,
    // `Some(None)` limpa o endereço, `None` mantém o atual.
    #[serde(default, with = "super::double_option")]
    pub address: Option<Option<String>>,
}

impl Organization {
    /// Aplica um patch sobre a entidade, devolvendo a versão editada.
    pub fn apply_patch(mut self, patch: &OrganizationPatch) -> Self {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(subdomain) = &patch.subdomain {
            self.subdomain = subdomain.clone();
        }
        self
    }
}

impl OrganizationUnit {
    pub fn apply_patch(mut self, patch: &OrganizationUnitPatch) -> Self {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(alias) = &patch.alias {
            self.alias = alias.clone();
        }
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        self
    }
}
