//! Theme listing and settings backups.

use shop_sync_core::{StoreRole, SyncDirection};
use shop_sync_dashboard::AppState;
use uuid::Uuid;

use super::{CommandError, Output};

pub async fn list(state: &AppState, role: StoreRole, output: Output) -> Result<(), CommandError> {
    let themes = state.themes().list_themes(role).await?;
    output.emit(&themes, |themes| {
        themes
            .iter()
            .map(|t| {
                let role = format!("{:?}", t.role).to_lowercase();
                format!("{:<14} {role:<12} {}", t.id, t.name)
            })
            .collect()
    })
}

pub async fn backups(state: &AppState, output: Output) -> Result<(), CommandError> {
    let handles = state
        .themes()
        .backup_store()
        .list()
        .await
        .map_err(shop_sync_dashboard::SyncError::from)?;
    output.emit(&handles, |handles| {
        handles
            .iter()
            .map(|h| {
                format!(
                    "{}  {}  {} theme {} ({})",
                    h.id,
                    h.created_at.format("%Y-%m-%d %H:%M:%S"),
                    h.source_domain,
                    h.theme_id,
                    h.direction.label()
                )
            })
            .collect()
    })
}

pub async fn backup(
    state: &AppState,
    direction: SyncDirection,
    output: Output,
) -> Result<(), CommandError> {
    let handle = state.themes().backup(direction).await?;
    output.emit(&handle, |h| {
        vec![format!(
            "Backed up {} theme {} as {}",
            h.source_domain, h.theme_id, h.id
        )]
    })
}

pub async fn push(
    state: &AppState,
    backup_id: Uuid,
    direction: SyncDirection,
    output: Output,
) -> Result<(), CommandError> {
    let receipt = state.themes().push(backup_id, direction).await?;
    output.emit(&receipt, |r| {
        vec![format!(
            "Pushed backup {} to {} theme {} ({} bytes)",
            r.backup_id, r.target_domain, r.theme_id, r.bytes
        )]
    })
}
