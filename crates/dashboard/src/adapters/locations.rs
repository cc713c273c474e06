//! Locations (GraphQL, report-only).
//!
//! Keyed by name. Shopify ties locations to billing and fulfillment setup,
//! so differences are reported rather than written.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential};

use crate::shopify::{
    ShopifyClient, ShopifyError,
    pagination::graphql_nodes,
    queries::{GetLocations, Location, PageVariables},
};
use crate::sync::{Capabilities, FetchError, ItemStream, ResourceAdapter};

use super::changed_fields;

const ADDRESS_FIELDS: &[&str] = &[
    "address1",
    "address2",
    "city",
    "provinceCode",
    "countryCode",
    "zip",
    "phone",
];

pub struct LocationsAdapter {
    client: ShopifyClient,
}

impl LocationsAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient) -> Self {
        Self { client }
    }
}

fn location_item(location: &Location) -> Result<ListedItem, serde_json::Error> {
    let payload = serde_json::to_value(location)?;
    Ok(ResourceItem::new(None, &location.name, Some(location.id.clone()), payload).into())
}

#[async_trait]
impl ResourceAdapter for LocationsAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Locations
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REPORT_ONLY
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        graphql_nodes::<GetLocations, _, _, _>(
            &self.client,
            store,
            PageVariables::after,
            |data| data.locations,
        )
        .map(move |location| {
            location
                .and_then(|location| location_item(&location).map_err(ShopifyError::from))
                .map_err(|e| FetchError::new(store, ResourceKind::Locations, e))
        })
        .boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        let empty = Value::Null;
        let source_address = source.payload.get("address").unwrap_or(&empty);
        let target_address = target.payload.get("address").unwrap_or(&empty);

        let mut changed = changed_fields(source_address, target_address, ADDRESS_FIELDS);
        changed.extend(changed_fields(&source.payload, &target.payload, &["isActive"]));
        changed
    }

    fn missing_reason(&self) -> String {
        "location missing in target store, add it in Shopify admin".to_string()
    }
}
