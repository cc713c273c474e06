//! Shopify-backed resource adapters, one per [`ResourceKind`].
//!
//! | Kind | create | update |
//! |------|--------|--------|
//! | collections | yes | yes |
//! | products | yes | yes |
//! | menus | yes | yes |
//! | locations | no | no |
//! | shipping-zones | no | no |
//! | discounts | yes | yes |
//! | tags | no | yes |
//! | theme-settings | yes | yes |
//! | shop-settings | no | no |

mod collections;
mod discounts;
mod locations;
mod menus;
mod products;
mod shipping_zones;
mod shop_settings;
mod tags;
mod theme_settings;

pub use collections::CollectionsAdapter;
pub use discounts::DiscountsAdapter;
pub use locations::LocationsAdapter;
pub use menus::MenusAdapter;
pub use products::ProductsAdapter;
pub use shipping_zones::ShippingZonesAdapter;
pub use shop_settings::ShopSettingsAdapter;
pub use tags::TagsAdapter;
pub use theme_settings::ThemeSettingsAdapter;

use std::collections::BTreeSet;

use serde_json::Value;
use shop_sync_core::{ListedItem, ResourceItem};

use crate::shopify::ShopifyClient;
use crate::sync::{AdapterRegistry, StoreRoles};

/// Registry with every Shopify adapter.
#[must_use]
pub fn shopify_registry(client: &ShopifyClient, stores: &StoreRoles) -> AdapterRegistry {
    AdapterRegistry::new()
        .with(CollectionsAdapter::new(client.clone()))
        .with(ProductsAdapter::new(client.clone()))
        .with(MenusAdapter::new(client.clone()))
        .with(LocationsAdapter::new(client.clone()))
        .with(ShippingZonesAdapter::new(client.clone()))
        .with(DiscountsAdapter::new(client.clone()))
        .with(TagsAdapter::new(client.clone()))
        .with(ThemeSettingsAdapter::new(client.clone(), stores.clone()))
        .with(ShopSettingsAdapter::new(client.clone()))
}

// =============================================================================
// Payload helpers
// =============================================================================

/// REST numeric or GraphQL string ID as a string.
fn id_string(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Keyed item from a REST object with `handle_key` / `title_key` fields.
fn rest_item(payload: Value, handle_key: Option<&str>, title_key: &str) -> ListedItem {
    let handle = handle_key
        .and_then(|key| payload.get(key))
        .and_then(Value::as_str)
        .map(str::to_string);
    let title = payload
        .get(title_key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let remote_id = id_string(&payload);
    ResourceItem::new(handle.as_deref(), &title, remote_id, payload).into()
}

/// Null, missing and blank strings compare equal; strings are trimmed.
fn normalized(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(s)) if s.trim().is_empty() => Value::Null,
        Some(Value::String(s)) => Value::String(s.trim().to_string()),
        Some(other) => other.clone(),
    }
}

/// Names of `fields` whose normalized values differ.
fn changed_fields(source: &Value, target: &Value, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| normalized(source.get(**field)) != normalized(target.get(**field)))
        .map(|field| (*field).to_string())
        .collect()
}

/// Case-insensitive tag set from a comma-separated string or an array.
fn tag_set(value: Option<&Value>) -> BTreeSet<String> {
    let raw: Vec<&str> = match value {
        Some(Value::String(s)) => s.split(',').collect(),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Tags as Shopify's REST API expects them: `"a, b, c"`.
fn joined_tags(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// Copy of `source` with only `fields` kept.
fn pick(source: &Value, fields: &[&str]) -> serde_json::Map<String, Value> {
    fields
        .iter()
        .filter_map(|field| source.get(*field).map(|v| ((*field).to_string(), v.clone())))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_set_ignores_order_and_case() {
        assert_eq!(
            tag_set(Some(&json!("Summer, sale ,NEW"))),
            tag_set(Some(&json!(["new", "SALE", "summer"])))
        );
        assert!(tag_set(Some(&json!(""))).is_empty());
        assert!(tag_set(None).is_empty());
    }

    #[test]
    fn test_joined_tags() {
        assert_eq!(joined_tags(Some(&json!(" a,b ,, c"))), "a, b, c");
        assert_eq!(joined_tags(Some(&json!(["x", "y"]))), "x, y");
    }

    #[test]
    fn test_changed_fields_treats_blank_as_null() {
        let source = json!({"title": "Shoes ", "body_html": "", "vendor": "Acme"});
        let target = json!({"title": "Shoes", "vendor": "Other"});
        assert_eq!(
            changed_fields(&source, &target, &["title", "body_html", "vendor"]),
            vec!["vendor"]
        );
    }

    #[test]
    fn test_rest_item_uses_numeric_id() {
        let listed = rest_item(json!({"id": 123, "handle": "Frontpage", "title": "Home"}), Some("handle"), "title");
        let ListedItem::Item(item) = listed else {
            panic!("expected a keyed item");
        };
        assert_eq!(item.identity_key, "frontpage");
        assert_eq!(item.remote_id.as_deref(), Some("123"));
    }

    #[test]
    fn test_rest_item_without_key_is_invalid() {
        let listed = rest_item(json!({"id": 5, "handle": null, "title": " "}), Some("handle"), "title");
        assert!(matches!(listed, ListedItem::Invalid(_)));
    }
}
