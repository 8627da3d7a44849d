// src/handlers/catalog.rs

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
    models::catalog::ItemVariantInput,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    // A lista enviada é o estado desejado das variantes do item.
    #[serde(default)]
    pub variants: Vec<ItemVariantInput>,
}

// POST /api/items
pub async fn create_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Json(payload): Json<ItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .item_service
        .create_item(
            user.0.id,
            org.0,
            &payload.name,
            payload.description.as_deref(),
            &payload.variants,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/items
pub async fn list_items(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.item_service.list_items(user.0.id, org.0).await?;
    Ok(Json(items))
}

// GET /api/items/{id}
pub async fn get_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.item_service.get_item(user.0.id, org.0, id).await?;
    Ok(Json(item))
}

// PUT /api/items/{id}
pub async fn update_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .item_service
        .update_item(
            user.0.id,
            org.0,
            id,
            &payload.name,
            payload.description.as_deref(),
            &payload.variants,
        )
        .await?;

    Ok(Json(item))
}

// DELETE /api/items/{id}
pub async fn delete_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .item_service
        .delete_item(user.0.id, org.0, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
