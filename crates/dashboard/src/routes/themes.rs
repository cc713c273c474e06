//! Theme listing, backup and push handlers.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::Deserialize;
use shop_sync_core::StoreRole;
use uuid::Uuid;

use crate::backup::{BackupHandle, PushReceipt};
use crate::error::{SyncError, SyncFailure};
use crate::shopify::Theme;
use crate::state::AppState;

use super::sync::{json_body, parse_direction};

/// Build the themes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/themes", get(list_themes))
        .route("/api/themes/backups", get(list_backups))
        .route("/api/themes/backup", post(backup))
        .route("/api/themes/push", post(push))
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackupRequest {
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PushRequest {
    pub backup_id: Uuid,
    #[serde(default)]
    pub direction: Option<String>,
}

/// List themes of one store.
///
/// # Errors
///
/// Returns an error for an unknown role, missing credentials or a failed request.
pub async fn list_themes(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<Theme>>, SyncError> {
    let role: StoreRole = query.role.parse().map_err(SyncError::BadRequest)?;
    Ok(Json(state.themes().list_themes(role).await?))
}

/// List stored backups, newest first.
///
/// # Errors
///
/// Returns an error if the backup directory cannot be read.
pub async fn list_backups(State(state): State<AppState>) -> Result<Json<Vec<BackupHandle>>, SyncError> {
    Ok(Json(state.themes().backup_store().list().await?))
}

/// Back up the source theme's settings.
///
/// # Errors
///
/// Returns a failure report if the backup cannot be taken.
pub async fn backup(
    State(state): State<AppState>,
    body: Result<Json<BackupRequest>, JsonRejection>,
) -> Result<Json<BackupHandle>, SyncFailure> {
    let body = json_body(body)?;
    let direction = parse_direction(body.direction.as_deref())?;
    state
        .themes()
        .backup(direction)
        .await
        .map(Json)
        .map_err(|e| SyncFailure::new(None, direction, e))
}

/// Push a stored backup into the target theme.
///
/// # Errors
///
/// Returns a failure report for an unknown backup or a failed upload.
pub async fn push(
    State(state): State<AppState>,
    body: Result<Json<PushRequest>, JsonRejection>,
) -> Result<Json<PushReceipt>, SyncFailure> {
    let body = json_body(body)?;
    let direction = parse_direction(body.direction.as_deref())?;
    state
        .themes()
        .push(body.backup_id, direction)
        .await
        .map(Json)
        .map_err(|e| SyncFailure::new(None, direction, e))
}
