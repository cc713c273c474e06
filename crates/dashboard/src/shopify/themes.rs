//! Theme and asset endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shop_sync_core::StoreCredential;
use tracing::instrument;

use super::{ShopifyClient, ShopifyError, pagination::take_array};

/// Asset holding a theme's customizer settings.
pub const SETTINGS_DATA_KEY: &str = "config/settings_data.json";

/// Theme role as reported by Shopify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeRole {
    Main,
    Unpublished,
    Demo,
    Development,
    Archived,
    Locked,
    #[serde(other)]
    Other,
}

/// Summary of one theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: u64,
    pub name: String,
    pub role: ThemeRole,
}

impl ShopifyClient {
    // =========================================================================
    // Theme methods
    // =========================================================================

    /// List every theme in a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, store), fields(store = %store.domain()))]
    pub async fn list_themes(&self, store: &StoreCredential) -> Result<Vec<Theme>, ShopifyError> {
        let page = self.rest_get(store, "themes.json", &[]).await?;
        take_array(page.body, "themes")?
            .into_iter()
            .map(|theme| serde_json::from_value(theme).map_err(ShopifyError::from))
            .collect()
    }

    /// ID of the store's published theme.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::NotFound`] when no theme has the `main` role.
    pub async fn main_theme_id(&self, store: &StoreCredential) -> Result<u64, ShopifyError> {
        self.list_themes(store)
            .await?
            .into_iter()
            .find(|theme| theme.role == ThemeRole::Main)
            .map(|theme| theme.id)
            .ok_or_else(|| ShopifyError::NotFound {
                what: format!("main theme in {}", store.domain()),
                body: String::new(),
            })
    }

    /// Theme to read or write settings for: `configured` when set, else the
    /// store's main theme.
    ///
    /// # Errors
    ///
    /// Returns an error if no theme is configured and the main theme cannot
    /// be found.
    pub async fn resolve_theme_id(
        &self,
        store: &StoreCredential,
        configured: Option<u64>,
    ) -> Result<u64, ShopifyError> {
        match configured {
            Some(id) => Ok(id),
            None => self.main_theme_id(store).await,
        }
    }

    // =========================================================================
    // Asset methods
    // =========================================================================

    /// Read a text asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the asset has no text value.
    #[instrument(skip(self, store), fields(store = %store.domain()))]
    pub async fn get_asset(
        &self,
        store: &StoreCredential,
        theme_id: u64,
        key: &str,
    ) -> Result<String, ShopifyError> {
        let page = self
            .rest_get(
                store,
                &format!("themes/{theme_id}/assets.json"),
                &[("asset[key]", key.to_string())],
            )
            .await?;

        page.body
            .get("asset")
            .and_then(|asset| asset.get("value"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ShopifyError::UnexpectedShape(format!("asset {key} has no value")))
    }

    /// Create or replace a text asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, store, value), fields(store = %store.domain(), bytes = value.len()))]
    pub async fn put_asset(
        &self,
        store: &StoreCredential,
        theme_id: u64,
        key: &str,
        value: &str,
    ) -> Result<(), ShopifyError> {
        self.rest_send(
            store,
            Method::PUT,
            &format!("themes/{theme_id}/assets.json"),
            &json!({ "asset": { "key": key, "value": value } }),
        )
        .await?;
        Ok(())
    }
}
