//! Product tags.
//!
//! Keyed by product handle like [`ProductsAdapter`](super::ProductsAdapter),
//! but only the tag set is compared and written. Products missing from the
//! target are reported; the products kind is what creates them.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Method;
use serde_json::json;
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential};

use crate::shopify::{ShopifyClient, pagination::rest_items};
use crate::sync::{Capabilities, FetchError, ItemStream, PushError, ResourceAdapter};

use super::{joined_tags, rest_item, tag_set};

const LIST_FIELDS: &str = "id,handle,title,tags";

pub struct TagsAdapter {
    client: ShopifyClient,
}

impl TagsAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceAdapter for TagsAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Tags
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE_ONLY
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        rest_items(
            &self.client,
            store,
            "products.json",
            "products",
            Some(LIST_FIELDS),
        )
        .map_ok(|product| rest_item(product, Some("handle"), "title"))
        .map_err(move |e| FetchError::new(store, ResourceKind::Tags, e))
        .boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        if tag_set(source.payload.get("tags")) == tag_set(target.payload.get("tags")) {
            Vec::new()
        } else {
            vec!["tags".to_string()]
        }
    }

    async fn update(
        &self,
        store: &StoreCredential,
        target: &ResourceItem,
        desired: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let id = target
            .remote_id
            .as_deref()
            .ok_or_else(|| PushError::new(store, "target product has no id"))?;
        let tags = joined_tags(desired.payload.get("tags"));

        let response = self
            .client
            .rest_send(
                store,
                Method::PUT,
                &format!("products/{id}.json"),
                &json!({ "product": { "id": target.payload.get("id"), "tags": tags } }),
            )
            .await
            .map_err(|e| PushError::new(store, e))?;

        let product = response
            .get("product")
            .cloned()
            .ok_or_else(|| PushError::new(store, "response had no product"))?;
        match rest_item(product, Some("handle"), "title") {
            ListedItem::Item(item) => Ok(item),
            ListedItem::Invalid(invalid) => Err(PushError::new(store, invalid.reason)),
        }
    }

    fn missing_reason(&self) -> String {
        "product missing in target store, sync products first".to_string()
    }
}
