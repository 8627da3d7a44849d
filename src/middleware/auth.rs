// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::auth::User};

pub const SESSION_COOKIE: &str = "storeit_session";

// O nome do cabeçalho que carrega a organização alvo da requisição.
const ORG_ID_HEADER: &str = "x-organization-id";

// O middleware em si: resolve o cookie de sessão e injeta o usuário nos
// "extensions" da requisição.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let secret = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or(AppError::InvalidSession)?;

    let user = app_state.auth_service.resolve_session(&secret).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidSession)
    }
}

// Extrator do escopo de organização. Guarda apenas o UUID informado; a
// checagem de vínculo/permissão acontece na camada de serviços.
#[derive(Debug, Clone, Copy)]
pub struct OrgContext(pub Uuid);

impl<S> FromRequestParts<S> for OrgContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(ORG_ID_HEADER).ok_or_else(|| {
            AppError::validation(
                "x-organization-id",
                "required",
                "O cabeçalho x-organization-id é obrigatório.",
            )
        })?;

        let value_str = value.to_str().map_err(|_| {
            AppError::validation(
                "x-organization-id",
                "invalid",
                "Cabeçalho x-organization-id contém caracteres inválidos.",
            )
        })?;

        let org_id = Uuid::parse_str(value_str).map_err(|_| {
            AppError::validation(
                "x-organization-id",
                "invalid",
                "Cabeçalho x-organization-id inválido (não é um UUID).",
            )
        })?;

        Ok(OrgContext(org_id))
    }
}
