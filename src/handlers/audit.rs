// src/handlers/audit.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AuthenticatedUser, OrgContext},
    models::audit::ObjectType,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChangesQuery {
    // Nome do tipo em snake_case, ex.: "storage_group".
    pub object_type: ObjectType,
    pub object_id: Uuid,
}

// GET /api/audit/changes?objectType=item&objectId=...
// Histórico completo de um objeto, na ordem de gravação.
pub async fn list_object_changes(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    org: OrgContext,
    Query(query): Query<ObjectChangesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state
        .audit_service
        .get_object_changes(user.0.id, org.0, query.object_type, query.object_id)
        .await?;

    Ok(Json(changes))
}
