// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Entidade inexistente, soft-deletada ou fora da organização do chamador
// viram todas `NotFound`: não vazamos a existência de dados de outro
// tenant.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Acesso negado")]
    NotAuthorized,

    #[error("Sessão inválida")]
    InvalidSession,

    #[error("{0}")]
    AlreadyExists(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Snapshot de auditoria que não serializa é erro interno, nunca 4xx.
    #[error("Erro de serialização")]
    SerializationError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Constrói um `ValidationError` de um único campo, para regras que o
    /// derive do validator não cobre.
    pub fn validation(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut error = validator::ValidationError::new(code);
        error.message = Some(message.into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(entity) => {
                let body = Json(json!({ "error": format!("{entity} não encontrado(a).") }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::NotAuthorized => (
                StatusCode::FORBIDDEN,
                "Você não tem permissão para realizar esta ação.".to_string(),
            ),
            AppError::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                "Sessão inválida ou expirada.".to_string(),
            ),
            AppError::AlreadyExists(message) => (StatusCode::CONFLICT, message),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro interno do servidor: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

/// Converte violação de constraint de unicidade em `AlreadyExists`, com a
/// mensagem dada; qualquer outro erro segue como `DatabaseError`.
pub fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::AlreadyExists(message.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_helper_carries_field_and_message() {
        let err = AppError::validation("alias", "alias_format", "Alias inválido.");
        match err {
            AppError::ValidationError(errors) => {
                let field_errors = errors.field_errors();
                let entry = field_errors.get("alias").expect("campo alias presente");
                assert_eq!(entry[0].code, "alias_format");
            }
            other => panic!("esperava ValidationError, veio {other:?}"),
        }
    }
}
