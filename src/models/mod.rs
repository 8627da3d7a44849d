// src/models/mod.rs

pub mod audit;
pub mod auth;
pub mod catalog;
pub mod rbac;
pub mod storage;
pub mod tenancy;

/// Helper de serde para campos de patch que precisam distinguir
/// "ausente no JSON" (mantém o valor) de "null" (limpa o valor).
pub mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer).map(Some)
    }
}
