//! Theme customizer settings (`config/settings_data.json`).
//!
//! One item per store: the settings asset of the configured theme, or the
//! store's main theme. Assets are single files, so there is nothing to
//! paginate.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde_json::{Value, json};
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential};

use crate::backup::strip_comments;
use crate::shopify::{ShopifyClient, ShopifyError, themes::SETTINGS_DATA_KEY};
use crate::sync::{Capabilities, FetchError, ItemStream, PushError, ResourceAdapter, StoreRoles};

pub struct ThemeSettingsAdapter {
    client: ShopifyClient,
    stores: StoreRoles,
}

impl ThemeSettingsAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient, stores: StoreRoles) -> Self {
        Self { client, stores }
    }

    async fn theme_id(&self, store: &StoreCredential) -> Result<u64, ShopifyError> {
        self.client
            .resolve_theme_id(store, self.stores.theme_id_for(store.domain()))
            .await
    }

    async fn put(
        &self,
        store: &StoreCredential,
        theme_id: u64,
        desired: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let raw = desired
            .str_field("settings")
            .ok_or_else(|| PushError::new(store, "item has no settings"))?;
        let settings = strip_comments(raw);

        self.client
            .put_asset(store, theme_id, SETTINGS_DATA_KEY, &settings)
            .await
            .map_err(|e| PushError::new(store, e))?;
        Ok(settings_item(theme_id, settings))
    }
}

fn settings_item(theme_id: u64, settings: String) -> ResourceItem {
    ResourceItem::singleton(
        SETTINGS_DATA_KEY,
        "Theme settings",
        Some(theme_id.to_string()),
        json!({ "theme_id": theme_id, "settings": settings }),
    )
}

/// Settings parsed as JSON once comments are removed.
fn parsed(item: &ResourceItem) -> Option<Value> {
    let raw = item.str_field("settings")?;
    serde_json::from_str(&strip_comments(raw)).ok()
}

#[async_trait]
impl ResourceAdapter for ThemeSettingsAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ThemeSettings
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::READ_WRITE
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        try_stream! {
            let theme_id = self.theme_id(store).await?;
            let settings = self.client.get_asset(store, theme_id, SETTINGS_DATA_KEY).await?;
            yield ListedItem::Item(settings_item(theme_id, settings));
        }
        .map_err(move |e: ShopifyError| FetchError::new(store, ResourceKind::ThemeSettings, e))
        .boxed()
    }

    /// Top-level settings keys that differ, e.g. `current` or `presets`.
    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        match (parsed(source), parsed(target)) {
            (Some(Value::Object(source)), Some(Value::Object(target))) => {
                let mut keys: Vec<String> = source
                    .keys()
                    .chain(target.keys())
                    .filter(|key| source.get(*key) != target.get(*key))
                    .cloned()
                    .collect();
                keys.sort();
                keys.dedup();
                keys
            }
            (Some(source), Some(target)) if source == target => Vec::new(),
            _ if source.str_field("settings") == target.str_field("settings") => Vec::new(),
            _ => vec!["settings".to_string()],
        }
    }

    async fn create(
        &self,
        store: &StoreCredential,
        item: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let theme_id = self
            .theme_id(store)
            .await
            .map_err(|e| PushError::new(store, e))?;
        self.put(store, theme_id, item).await
    }

    async fn update(
        &self,
        store: &StoreCredential,
        target: &ResourceItem,
        desired: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let theme_id = match target.remote_id.as_deref().and_then(|id| id.parse().ok()) {
            Some(id) => id,
            None => self
                .theme_id(store)
                .await
                .map_err(|e| PushError::new(store, e))?,
        };
        self.put(store, theme_id, desired).await
    }
}
