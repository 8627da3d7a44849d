// src/handlers/storage.rs

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
    models::storage::{CellPatch, CellsGroupPatch, StorageGroupPatch},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStorageGroupPayload {
    pub unit_id: Uuid,

    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "O alias é obrigatório."))]
    pub alias: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCellsGroupPayload {
    pub storage_group_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "O alias é obrigatório."))]
    pub alias: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCellPayload {
    pub cells_group_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "O alias é obrigatório."))]
    pub alias: String,

    #[validate(range(min = 1, message = "A linha começa em 1."))]
    pub row: i32,

    #[validate(range(min = 1, message = "O nível começa em 1."))]
    pub level: i32,

    #[validate(range(min = 1, message = "A posição começa em 1."))]
    pub position: i32,
}

// ---
// Grupos de armazenamento
// ---

// POST /api/storage-groups
pub async fn create_storage_group(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Json(payload): Json<CreateStorageGroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let group = app_state
        .storage_service
        .create_storage_group(
            user.0.id,
            org.0,
            payload.unit_id,
            payload.parent_id,
            &payload.name,
            &payload.alias,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

// GET /api/storage-groups
pub async fn list_storage_groups(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
) -> Result<impl IntoResponse, AppError> {
    let groups = app_state
        .storage_service
        .list_storage_groups(user.0.id, org.0)
        .await?;

    Ok(Json(groups))
}

// GET /api/storage-groups/{id}
pub async fn get_storage_group(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state
        .storage_service
        .get_storage_group(user.0.id, org.0, id)
        .await?;

    Ok(Json(group))
}

// PATCH /api/storage-groups/{id}
pub async fn patch_storage_group(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<StorageGroupPatch>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state
        .storage_service
        .patch_storage_group(user.0.id, org.0, id, &patch)
        .await?;

    Ok(Json(group))
}

// DELETE /api/storage-groups/{id}
pub async fn delete_storage_group(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .storage_service
        .delete_storage_group(user.0.id, org.0, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Grupos de células
// ---

// POST /api/cells-groups
pub async fn create_cells_group(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Json(payload): Json<CreateCellsGroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let group = app_state
        .storage_service
        .create_cells_group(
            user.0.id,
            org.0,
            payload.storage_group_id,
            &payload.name,
            &payload.alias,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

// GET /api/cells-groups
pub async fn list_cells_groups(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
) -> Result<impl IntoResponse, AppError> {
    let groups = app_state
        .storage_service
        .list_cells_groups(user.0.id, org.0)
        .await?;

    Ok(Json(groups))
}

// GET /api/cells-groups/{id}
pub async fn get_cells_group(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state
        .storage_service
        .get_cells_group(user.0.id, org.0, id)
        .await?;

    Ok(Json(group))
}

// PATCH /api/cells-groups/{id}
pub async fn patch_cells_group(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<CellsGroupPatch>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state
        .storage_service
        .patch_cells_group(user.0.id, org.0, id, &patch)
        .await?;

    Ok(Json(group))
}

// DELETE /api/cells-groups/{id}
pub async fn delete_cells_group(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .storage_service
        .delete_cells_group(user.0.id, org.0, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Células
// ---

// POST /api/cells
pub async fn create_cell(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Json(payload): Json<CreateCellPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cell = app_state
        .storage_service
        .create_cell(
            user.0.id,
            org.0,
            payload.cells_group_id,
            &payload.alias,
            payload.row,
            payload.level,
            payload.position,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(cell)))
}

// GET /api/cells-groups/{id}/cells
pub async fn list_cells(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let cells = app_state
        .storage_service
        .list_cells(user.0.id, org.0, id)
        .await?;

    Ok(Json(cells))
}

// GET /api/cells/{id}
pub async fn get_cell(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let cell = app_state
        .storage_service
        .get_cell(user.0.id, org.0, id)
        .await?;

    Ok(Json(cell))
}

// PATCH /api/cells/{id}
pub async fn patch_cell(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<CellPatch>,
) -> Result<impl IntoResponse, AppError> {
    let cell = app_state
        .storage_service
        .patch_cell(user.0.id, org.0, id, &patch)
        .await?;

    Ok(Json(cell))
}

// DELETE /api/cells/{id}
pub async fn delete_cell(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .storage_service
        .delete_cell(user.0.id, org.0, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
