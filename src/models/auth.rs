// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Usuário ---
// O usuário é global (não pertence a uma organização); o vínculo com as
// organizações é feito pelos role bindings (ver models/rbac.rs).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    // Identidade externa (login via Yandex OAuth)
    pub yandex_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Sessão ---
// O `secret` é um token opaco guardado no cookie `storeit_session`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub secret: String,
    pub created_at: DateTime<Utc>,
    pub invalidated_at: Option<DateTime<Utc>>,
}
