// src/handlers/tenancy.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AuthenticatedUser, OrgContext},
    models::tenancy::{OrganizationPatch, OrganizationUnitPatch},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, max = 63, message = "O subdomínio é obrigatório."))]
    pub subdomain: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "O alias é obrigatório."))]
    pub alias: String,

    pub address: Option<String>,
}

// ---
// Organizações
// ---

// POST /api/orgs
pub async fn create_organization(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let org = app_state
        .org_service
        .create_organization(user.0.id, &payload.name, &payload.subdomain)
        .await?;

    Ok((StatusCode::CREATED, Json(org)))
}

// GET /api/orgs
pub async fn list_organizations(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let orgs = app_state
        .org_service
        .list_user_organizations(user.0.id)
        .await?;

    Ok(Json(orgs))
}

// GET /api/orgs/{id}
pub async fn get_organization(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let org = app_state.org_service.get_organization(user.0.id, id).await?;
    Ok(Json(org))
}

// PATCH /api/orgs/{id}
pub async fn patch_organization(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<OrganizationPatch>,
) -> Result<impl IntoResponse, AppError> {
    let org = app_state
        .org_service
        .patch_organization(user.0.id, id, &patch)
        .await?;

    Ok(Json(org))
}

// DELETE /api/orgs/{id}
pub async fn delete_organization(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .org_service
        .delete_organization(user.0.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Unidades
// ---

// POST /api/units
pub async fn create_unit(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Json(payload): Json<CreateUnitPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let unit = app_state
        .org_service
        .create_unit(
            user.0.id,
            org.0,
            &payload.name,
            &payload.alias,
            payload.address.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(unit)))
}

// GET /api/units
pub async fn list_units(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
) -> Result<impl IntoResponse, AppError> {
    let units = app_state.org_service.list_units(user.0.id, org.0).await?;
    Ok(Json(units))
}

// GET /api/units/{id}
pub async fn get_unit(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let unit = app_state.org_service.get_unit(user.0.id, org.0, id).await?;
    Ok(Json(unit))
}

// PATCH /api/units/{id}
pub async fn patch_unit(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<OrganizationUnitPatch>,
) -> Result<impl IntoResponse, AppError> {
    let unit = app_state
        .org_service
        .patch_unit(user.0.id, org.0, id, &patch)
        .await?;

    Ok(Json(unit))
}

// DELETE /api/units/{id}
pub async fn delete_unit(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .org_service
        .delete_unit(user.0.id, org.0, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
