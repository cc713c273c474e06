//! Store-wide settings (GraphQL `shop`, compare-only).
//!
//! The Admin API exposes no mutation for these fields, so the single shop
//! item is only ever reported.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential};

use crate::shopify::{
    ShopifyClient, ShopifyError,
    queries::{GetShop, NoVariables, Shop},
};
use crate::sync::{Capabilities, FetchError, ItemStream, ResourceAdapter};

use super::changed_fields;

/// Identity key of the one shop item in each store.
const SHOP_KEY: &str = "shop";

const COMPARED_FIELDS: &[&str] = &[
    "name",
    "email",
    "contactEmail",
    "currencyCode",
    "weightUnit",
    "ianaTimezone",
    "taxesIncluded",
    "taxShipping",
    "currencyFormats",
];

pub struct ShopSettingsAdapter {
    client: ShopifyClient,
}

impl ShopSettingsAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient) -> Self {
        Self { client }
    }
}

fn shop_item(shop: &Shop) -> Result<ResourceItem, serde_json::Error> {
    Ok(ResourceItem::singleton(
        SHOP_KEY,
        "Shop settings",
        Some(shop.id.clone()),
        serde_json::to_value(shop)?,
    ))
}

#[async_trait]
impl ResourceAdapter for ShopSettingsAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ShopSettings
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REPORT_ONLY
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        try_stream! {
            let data = self.client.execute::<GetShop>(store, NoVariables {}).await?;
            yield ListedItem::Item(shop_item(&data.shop)?);
        }
        .map_err(move |e: ShopifyError| FetchError::new(store, ResourceKind::ShopSettings, e))
        .boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        changed_fields(&source.payload, &target.payload, COMPARED_FIELDS)
    }

    fn differing_reason(&self, changed_fields: &[String]) -> String {
        format!(
            "shop settings differ in {}, update them in Shopify admin",
            changed_fields.join(", ")
        )
    }
}
