// src/handlers/rbac.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AuthenticatedUser, OrgContext},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRolePayload {
    pub user_id: Uuid,
    pub role_id: i32,
}

// GET /api/roles
pub async fn list_roles(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let roles = app_state.access_service.list_roles().await?;
    Ok(Json(roles))
}

// GET /api/roles/permissions
pub async fn list_role_permissions(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let permissions = app_state.access_service.list_role_permissions().await?;
    Ok(Json(permissions))
}

// POST /api/members
pub async fn grant_role(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Json(payload): Json<GrantRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .access_service
        .grant_role(user.0.id, org.0, payload.user_id, payload.role_id)
        .await?;

    Ok(StatusCode::CREATED)
}

// GET /api/members
pub async fn list_members(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
) -> Result<impl IntoResponse, AppError> {
    let bindings = app_state
        .access_service
        .list_bindings(user.0.id, org.0)
        .await?;

    Ok(Json(bindings))
}
