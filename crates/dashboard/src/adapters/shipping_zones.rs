//! Shipping zones (REST, report-only).
//!
//! The Admin API has no endpoint for creating shipping zones, so missing
//! and differing zones are reported for manual action. Shopify returns all
//! zones in one response; there is no cursor to follow.

use std::collections::BTreeSet;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde_json::Value;
use shop_sync_core::{ResourceItem, ResourceKind, StoreCredential};

use crate::shopify::{ShopifyClient, pagination::take_array};
use crate::sync::{Capabilities, FetchError, ItemStream, ResourceAdapter};

use super::rest_item;

pub struct ShippingZonesAdapter {
    client: ShopifyClient,
}

impl ShippingZonesAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient) -> Self {
        Self { client }
    }
}

/// Country codes served by a zone.
fn countries(zone: &Value) -> BTreeSet<String> {
    zone.get("countries")
        .and_then(Value::as_array)
        .map(|countries| {
            countries
                .iter()
                .filter_map(|country| country.get("code").and_then(Value::as_str))
                .map(str::to_uppercase)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ResourceAdapter for ShippingZonesAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ShippingZones
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REPORT_ONLY
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        try_stream! {
            let page = self.client.rest_get(store, "shipping_zones.json", &[]).await?;
            for zone in take_array(page.body, "shipping_zones")? {
                yield rest_item(zone, None, "name");
            }
        }
        .map_err(move |e: crate::shopify::ShopifyError| {
            FetchError::new(store, ResourceKind::ShippingZones, e)
        })
        .boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        if countries(&source.payload) == countries(&target.payload) {
            Vec::new()
        } else {
            vec!["countries".to_string()]
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;
    use shop_sync_core::ListedItem;

    fn zone(payload: Value) -> ResourceItem {
        match rest_item(payload, None, "name") {
            ListedItem::Item(item) => item,
            ListedItem::Invalid(invalid) => panic!("invalid: {}", invalid.reason),
        }
    }

    fn adapter() -> ShippingZonesAdapter {
        ShippingZonesAdapter::new(
            ShopifyClient::new(&crate::config::ShopifyApiConfig::default()).unwrap(),
        )
    }

    #[test]
    fn test_compare_country_sets() {
        let source = zone(json!({"id": 1, "name": "Europe", "countries": [{"code": "DE"}, {"code": "FR"}]}));
        let same = zone(json!({"id": 2, "name": "europe", "countries": [{"code": "fr"}, {"code": "DE"}]}));
        let fewer = zone(json!({"id": 3, "name": "Europe", "countries": [{"code": "DE"}]}));

        assert!(adapter().compare(&source, &same).is_empty());
        assert_eq!(adapter().compare(&source, &fewer), vec!["countries"]);
    }

    #[test]
    fn test_missing_zone_needs_manual_creation() {
        assert_eq!(adapter().capabilities(), Capabilities::REPORT_ONLY);
        assert_eq!(
            adapter().missing_reason(),
            "missing in target store, create manually"
        );
    }
}
