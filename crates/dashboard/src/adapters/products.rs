//! Products.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Method;
use serde_json::{Value, json};
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential};

use crate::shopify::{ShopifyClient, pagination::rest_items};
use crate::sync::{Capabilities, FetchError, ItemStream, PushError, ResourceAdapter};

use super::{changed_fields, joined_tags, pick, rest_item, tag_set};

const COMPARED_FIELDS: &[&str] = &["title", "body_html", "vendor", "product_type", "status"];

/// Store-specific keys removed (at any depth) before creating a product in
/// another store.
const STORE_SPECIFIC_KEYS: &[&str] = &[
    "id",
    "product_id",
    "admin_graphql_api_id",
    "inventory_item_id",
    "image_id",
    "variant_ids",
    "created_at",
    "updated_at",
    "published_at",
    "inventory_quantity",
    "old_inventory_quantity",
];

pub struct ProductsAdapter {
    client: ShopifyClient,
}

impl ProductsAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        store: &StoreCredential,
        method: Method,
        path: &str,
        product: Value,
    ) -> Result<ResourceItem, PushError> {
        let response = self
            .client
            .rest_send(store, method, path, &json!({ "product": product }))
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
}

fn strip_store_specific(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !STORE_SPECIFIC_KEYS.contains(&key.as_str()));
            // `image` duplicates the first entry of `images`
            map.remove("image");
            map.values_mut().for_each(strip_store_specific);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_store_specific),
        _ => {}
    }
}

/// Product body for creating `source` in another store.
fn create_body(source: &ResourceItem) -> Value {
    let mut product = source.payload.clone();
    strip_store_specific(&mut product);
    product
}

/// Core fields for updating `target` to match `desired`.
fn update_body(target: &ResourceItem, desired: &ResourceItem) -> Value {
    let mut body = pick(&desired.payload, COMPARED_FIELDS);
    body.insert(
        "tags".to_string(),
        json!(joined_tags(desired.payload.get("tags"))),
    );
    if let Some(id) = target.payload.get("id") {
        body.insert("id".to_string(), id.clone());
    }
    Value::Object(body)
}

#[async_trait]
impl ResourceAdapter for ProductsAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Products
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::READ_WRITE
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        rest_items(&self.client, store, "products.json", "products", None)
            .map_ok(|product| rest_item(product, Some("handle"), "title"))
            .map_err(move |e| FetchError::new(store, ResourceKind::Products, e))
            .boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        let mut changed = changed_fields(&source.payload, &target.payload, COMPARED_FIELDS);
        if tag_set(source.payload.get("tags")) != tag_set(target.payload.get("tags")) {
            changed.push("tags".to_string());
        }
        changed
    }

    async fn create(
        &self,
        store: &StoreCredential,
        item: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        self.send(store, Method::POST, "products.json", create_body(item))
            .await
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
        self.send(
            store,
            Method::PUT,
            &format!("products/{id}.json"),
            update_body(target, desired),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(payload: Value) -> ResourceItem {
        match rest_item(payload, Some("handle"), "title") {
            ListedItem::Item(item) => item,
            ListedItem::Invalid(invalid) => panic!("invalid: {}", invalid.reason),
        }
    }

    fn adapter() -> ProductsAdapter {
        ProductsAdapter::new(ShopifyClient::new(&crate::config::ShopifyApiConfig::default()).unwrap())
    }

    #[test]
    fn test_create_body_strips_ids_at_every_depth() {
        let source = product(json!({
            "id": 1,
            "handle": "tee",
            "title": "Tee",
            "admin_graphql_api_id": "gid://shopify/Product/1",
            "variants": [{"id": 10, "product_id": 1, "inventory_item_id": 100, "price": "10.00", "sku": "TEE-1"}],
            "images": [{"id": 20, "product_id": 1, "variant_ids": [10], "src": "https://cdn/x.png"}],
            "image": {"id": 20, "src": "https://cdn/x.png"},
            "options": [{"id": 30, "product_id": 1, "name": "Size", "values": ["M"]}]
        }));

        let body = create_body(&source);

        assert!(body.get("id").is_none());
        assert!(body.get("image").is_none());
        assert_eq!(body["variants"][0], json!({"price": "10.00", "sku": "TEE-1"}));
        assert_eq!(body["images"][0], json!({"src": "https://cdn/x.png"}));
        assert_eq!(body["options"][0], json!({"name": "Size", "values": ["M"]}));
        assert_eq!(body["handle"], "tee");
    }

    #[test]
    fn test_compare_ignores_tag_order_and_case() {
        let source = product(json!({"handle": "tee", "title": "Tee", "tags": "Summer, Sale"}));
        let target = product(json!({"handle": "tee", "title": "Tee", "tags": "sale, summer"}));
        assert!(adapter().compare(&source, &target).is_empty());
    }

    #[test]
    fn test_compare_reports_changed_fields() {
        let source = product(json!({"handle": "tee", "title": "Tee", "vendor": "Acme", "status": "active", "tags": "a"}));
        let target = product(json!({"handle": "tee", "title": "Tee", "vendor": "Acme", "status": "draft", "tags": "a, b"}));
        assert_eq!(adapter().compare(&source, &target), vec!["status", "tags"]);
    }

    #[test]
    fn test_update_body() {
        let target = product(json!({"id": 55, "handle": "tee", "title": "Old"}));
        let desired = product(json!({"id": 1, "handle": "tee", "title": "New", "tags": "a,b", "variants": []}));

        let body = update_body(&target, &desired);
        assert_eq!(body, json!({"id": 55, "title": "New", "tags": "a, b"}));
    }
}
