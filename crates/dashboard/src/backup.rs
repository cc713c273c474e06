//! Theme settings backups.
//!
//! A backup is an explicit, persisted snapshot of a theme's
//! `config/settings_data.json`. Taking one returns a [`BackupHandle`]; pushing
//! requires that handle's ID. There is no process-wide "last backup".

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_sync_core::{StoreRole, SyncDirection};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::error::SyncError;
use crate::shopify::{ShopifyClient, Theme, themes::SETTINGS_DATA_KEY};
use crate::sync::{StoreRoles, resolve};

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Backup not found: {0}")]
    NotFound(Uuid),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt backup file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Identifies one stored backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupHandle {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Store the settings were read from.
    pub source_domain: String,
    pub theme_id: u64,
    pub direction: SyncDirection,
}

/// Stored envelope: handle plus the raw settings text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeBackup {
    pub handle: BackupHandle,
    pub settings: String,
}

/// Result of pushing a backup into a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushReceipt {
    pub backup_id: Uuid,
    pub target_domain: String,
    pub theme_id: u64,
    pub bytes: usize,
}

/// Directory of `<id>.json` backup files.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Persist a backup, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, backup: &ThemeBackup) -> Result<(), BackupError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path(backup.handle.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(backup)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Load a backup by ID.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::NotFound`] when no file exists for `id`.
    pub async fn load(&self, id: Uuid) -> Result<ThemeBackup, BackupError> {
        let bytes = match tokio::fs::read(self.path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackupError::NotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Handles of every stored backup, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a backup file cannot be read.
    pub async fn list(&self) -> Result<Vec<BackupHandle>, BackupError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut handles = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let backup: ThemeBackup = serde_json::from_slice(&tokio::fs::read(&path).await?)?;
                handles.push(backup.handle);
            }
        }
        handles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(handles)
    }
}

/// Remove `/* ... */` comments. Shopify prepends one to `settings_data.json`
/// and rejects it on upload. An unterminated comment is left as is.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        let Some(len) = rest.get(start + 2..).and_then(|tail| tail.find("*/")) else {
            break;
        };
        out.push_str(rest.get(..start).unwrap_or_default());
        rest = rest.get(start + 2 + len + 2..).unwrap_or_default();
    }
    out.push_str(rest);
    out
}

/// Theme listing, backup and push.
#[derive(Debug, Clone)]
pub struct ThemeBackups {
    client: ShopifyClient,
    stores: StoreRoles,
    store: BackupStore,
}

impl ThemeBackups {
    #[must_use]
    pub const fn new(client: ShopifyClient, stores: StoreRoles, store: BackupStore) -> Self {
        Self {
            client,
            stores,
            store,
        }
    }

    #[must_use]
    pub const fn backup_store(&self) -> &BackupStore {
        &self.store
    }

    /// Themes of the store playing `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the role is not configured or the request fails.
    pub async fn list_themes(&self, role: StoreRole) -> Result<Vec<Theme>, SyncError> {
        let store = self.stores.credential(role)?;
        Ok(self.client.list_themes(&store).await?)
    }

    /// Snapshot the source theme's settings for `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing, the asset cannot be read
    /// or the backup cannot be written.
    #[instrument(skip(self))]
    pub async fn backup(&self, direction: SyncDirection) -> Result<BackupHandle, SyncError> {
        let stores = resolve(direction, &self.stores)?;
        let theme_id = self
            .client
            .resolve_theme_id(&stores.source, self.stores.theme_id_for(stores.source.domain()))
            .await?;
        let settings = self
            .client
            .get_asset(&stores.source, theme_id, SETTINGS_DATA_KEY)
            .await?;

        let handle = BackupHandle {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source_domain: stores.source.domain().to_string(),
            theme_id,
            direction,
        };
        self.store
            .save(&ThemeBackup {
                handle: handle.clone(),
                settings,
            })
            .await?;

        tracing::info!(backup_id = %handle.id, theme_id, "Theme settings backed up");
        Ok(handle)
    }

    /// Push a stored backup into the target theme for `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::NotFound`] for an unknown ID, or an error if
    /// credentials are missing or the upload fails.
    #[instrument(skip(self))]
    pub async fn push(
        &self,
        backup_id: Uuid,
        direction: SyncDirection,
    ) -> Result<PushReceipt, SyncError> {
        let stores = resolve(direction, &self.stores)?;
        let backup = self.store.load(backup_id).await?;
        let theme_id = self
            .client
            .resolve_theme_id(&stores.target, self.stores.theme_id_for(stores.target.domain()))
            .await?;

        let settings = strip_comments(&backup.settings);
        self.client
            .put_asset(&stores.target, theme_id, SETTINGS_DATA_KEY, &settings)
            .await?;

        tracing::info!(%backup_id, theme_id, target = %stores.target.domain(), "Theme settings pushed");
        Ok(PushReceipt {
            backup_id,
            target_domain: stores.target.domain().to_string(),
            theme_id,
            bytes: settings.len(),
        })
    }
}
