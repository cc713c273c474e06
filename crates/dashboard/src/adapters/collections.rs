//! Custom and smart collections.
//!
//! Both REST collection types are listed into one sequence keyed by handle.
//! The type is kept in the payload under `collection_type` so creates and
//! updates go to the matching endpoint.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Method;
use serde_json::{Value, json};
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential};

use crate::shopify::{ShopifyClient, pagination::rest_items};
use crate::sync::{Capabilities, FetchError, ItemStream, PushError, ResourceAdapter};

use super::{changed_fields, pick, rest_item};

const COMMON_FIELDS: &[&str] = &["title", "body_html", "sort_order", "template_suffix"];
const SMART_FIELDS: &[&str] = &["rules", "disjunctive"];

/// Which REST resource a collection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionType {
    Custom,
    Smart,
}

impl CollectionType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Smart => "smart",
        }
    }

    /// Singular JSON root, e.g. `custom_collection`.
    const fn root(self) -> &'static str {
        match self {
            Self::Custom => "custom_collection",
            Self::Smart => "smart_collection",
        }
    }

    const fn list_path(self) -> &'static str {
        match self {
            Self::Custom => "custom_collections.json",
            Self::Smart => "smart_collections.json",
        }
    }

    const fn list_key(self) -> &'static str {
        match self {
            Self::Custom => "custom_collections",
            Self::Smart => "smart_collections",
        }
    }

    fn of(item: &ResourceItem) -> Self {
        if item.str_field("collection_type") == Some("smart") {
            Self::Smart
        } else {
            Self::Custom
        }
    }
}

pub struct CollectionsAdapter {
    client: ShopifyClient,
}

impl CollectionsAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        store: &StoreCredential,
        method: Method,
        path: &str,
        collection_type: CollectionType,
        body: serde_json::Map<String, Value>,
    ) -> Result<ResourceItem, PushError> {
        let response = self
            .client
            .rest_send(store, method, path, &json!({ collection_type.root(): body }))
            .await
            .map_err(|e| PushError::new(store, e))?;

        let collection = response
            .get(collection_type.root())
            .cloned()
            .ok_or_else(|| PushError::new(store, "response had no collection"))?;
        match tag_type(collection, collection_type) {
            ListedItem::Item(item) => Ok(item),
            ListedItem::Invalid(invalid) => Err(PushError::new(store, invalid.reason)),
        }
    }
}

fn tag_type(mut collection: Value, collection_type: CollectionType) -> ListedItem {
    if let Some(obj) = collection.as_object_mut() {
        obj.insert("collection_type".to_string(), json!(collection_type.as_str()));
    }
    rest_item(collection, Some("handle"), "title")
}

/// Fields sent when creating a collection from a source item.
fn create_body(source: &ResourceItem, collection_type: CollectionType) -> serde_json::Map<String, Value> {
    let mut body = pick(&source.payload, &["title", "handle", "body_html", "sort_order", "template_suffix", "published"]);
    if collection_type == CollectionType::Smart {
        body.extend(pick(&source.payload, SMART_FIELDS));
    }
    if let Some(src) = source.payload.pointer("/image/src").and_then(Value::as_str) {
        let alt = source.payload.pointer("/image/alt").cloned().unwrap_or(Value::Null);
        body.insert("image".to_string(), json!({ "src": src, "alt": alt }));
    }
    body
}

/// Fields sent when updating `target` to match `desired`.
fn update_body(
    target: &ResourceItem,
    desired: &ResourceItem,
    target_type: CollectionType,
) -> serde_json::Map<String, Value> {
    let mut body = pick(&desired.payload, COMMON_FIELDS);
    if target_type == CollectionType::Smart && CollectionType::of(desired) == CollectionType::Smart {
        body.extend(pick(&desired.payload, SMART_FIELDS));
    }
    if let Some(id) = target.payload.get("id") {
        body.insert("id".to_string(), id.clone());
    }
    body
}

#[async_trait]
impl ResourceAdapter for CollectionsAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Collections
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::READ_WRITE
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        let listing = |collection_type: CollectionType| {
            rest_items(
                &self.client,
                store,
                collection_type.list_path(),
                collection_type.list_key(),
                None,
            )
            .map_ok(move |collection| tag_type(collection, collection_type))
        };

        listing(CollectionType::Custom)
            .chain(listing(CollectionType::Smart))
            .map_err(move |e| FetchError::new(store, ResourceKind::Collections, e))
            .boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        let mut changed = changed_fields(&source.payload, &target.payload, COMMON_FIELDS);
        let (source_type, target_type) = (CollectionType::of(source), CollectionType::of(target));
        if source_type != target_type {
            changed.push("collection_type".to_string());
        } else if source_type == CollectionType::Smart {
            changed.extend(changed_fields(&source.payload, &target.payload, SMART_FIELDS));
        }
        changed
    }

    async fn create(
        &self,
        store: &StoreCredential,
        item: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let collection_type = CollectionType::of(item);
        self.send(
            store,
            Method::POST,
            collection_type.list_path(),
            collection_type,
            create_body(item, collection_type),
        )
        .await
    }

    async fn update(
        &self,
        store: &StoreCredential,
        target: &ResourceItem,
        desired: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let target_type = CollectionType::of(target);
        let id = target
            .remote_id
            .as_deref()
            .ok_or_else(|| PushError::new(store, "target collection has no id"))?;
        self.send(
            store,
            Method::PUT,
            &format!("{}/{id}.json", target_type.list_key()),
            target_type,
            update_body(target, desired, target_type),
        )
        .await
    }
}
