// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AuthenticatedUser, SESSION_COOKIE},
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct YandexLoginPayload {
    #[validate(length(min = 1, message = "O campo 'accessToken' é obrigatório."))]
    pub access_token: String,
}

// POST /api/auth/yandex
// Troca o access token do OAuth por uma sessão local, entregue em um
// cookie httpOnly.
pub async fn login_with_yandex(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<YandexLoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (user, session) = app_state
        .auth_service
        .login_with_yandex(&payload.access_token)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.secret.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Json(user)))
}

// POST /api/auth/logout
pub async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        app_state.auth_service.logout(cookie.value()).await?;
    }

    // Remove o cookie mesmo que a sessão já estivesse invalidada.
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    Ok((jar, StatusCode::NO_CONTENT))
}

// GET /api/auth/me
pub async fn get_current_user(user: AuthenticatedUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user.0))
}
