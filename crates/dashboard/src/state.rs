//! Application state shared across handlers.

use std::sync::Arc;

use crate::adapters::shopify_registry;
use crate::backup::{BackupStore, ThemeBackups};
use crate::config::SyncConfig;
use crate::shopify::{ShopifyClient, ShopifyError};
use crate::sync::SyncOrchestrator;

/// Application state shared across all handlers.
///
/// Cheap to clone. Holds configuration and clients only; nothing here
/// changes between requests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    orchestrator: SyncOrchestrator,
    themes: ThemeBackups,
}

impl AppState {
    /// Build the state for a configured dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SyncConfig) -> Result<Self, ShopifyError> {
        let client = ShopifyClient::new(&config.shopify)?;
        let registry = shopify_registry(&client, &config.stores);

        Ok(Self::from_parts(
            SyncOrchestrator::new(registry, config.stores.clone(), config.write_policy),
            ThemeBackups::new(
                client,
                config.stores.clone(),
                BackupStore::new(&config.backup_dir),
            ),
        ))
    }

    /// Build the state from pre-built parts.
    #[must_use]
    pub fn from_parts(orchestrator: SyncOrchestrator, themes: ThemeBackups) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                orchestrator,
                themes,
            }),
        }
    }

    #[must_use]
    pub fn orchestrator(&self) -> &SyncOrchestrator {
        &self.inner.orchestrator
    }

    #[must_use]
    pub fn themes(&self) -> &ThemeBackups {
        &self.inner.themes
    }
}
