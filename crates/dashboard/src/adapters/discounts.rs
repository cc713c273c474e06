//! Discounts: REST price rules plus their discount codes.
//!
//! One item per price rule, keyed by title, with the rule's codes folded
//! into the payload (`{"price_rule": {...}, "codes": [...]}`). Creating
//! writes the rule first, then each code under the new rule.

use std::collections::BTreeSet;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, future};
use reqwest::Method;
use serde_json::{Map, Value, json};
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential};

use crate::shopify::{ShopifyClient, ShopifyError, pagination::rest_items};
use crate::sync::{Capabilities, FetchError, ItemStream, PushError, ResourceAdapter};

use super::{changed_fields, id_string};

const RULE_FIELDS: &[&str] = &[
    "value",
    "value_type",
    "target_type",
    "target_selection",
    "allocation_method",
    "customer_selection",
    "usage_limit",
    "once_per_customer",
    "starts_at",
    "ends_at",
];

const ENTITLEMENT_FIELDS: &[&str] = &[
    "entitled_product_ids",
    "entitled_collection_ids",
    "entitled_variant_ids",
];

/// Field defaults applied when the source rule leaves them unset.
const RULE_DEFAULTS: &[(&str, &str)] = &[
    ("target_type", "line_item"),
    ("target_selection", "all"),
    ("allocation_method", "across"),
    ("value_type", "percentage"),
    ("customer_selection", "all"),
];

pub struct DiscountsAdapter {
    client: ShopifyClient,
}

impl DiscountsAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient) -> Self {
        Self { client }
    }

    async fn add_codes(
        &self,
        store: &StoreCredential,
        rule_id: &str,
        codes: &[String],
    ) -> Result<(), PushError> {
        let path = format!("price_rules/{rule_id}/discount_codes.json");
        for code in codes {
            self.client
                .rest_send(
                    store,
                    Method::POST,
                    &path,
                    &json!({ "discount_code": { "code": code } }),
                )
                .await
                .map_err(|e| PushError::new(store, format!("code {code}: {e}")))?;
        }
        Ok(())
    }

    async fn send_rule(
        &self,
        store: &StoreCredential,
        method: Method,
        path: &str,
        rule: Map<String, Value>,
    ) -> Result<Value, PushError> {
        let response = self
            .client
            .rest_send(store, method, path, &json!({ "price_rule": rule }))
            .await
            .map_err(|e| PushError::new(store, e))?;
        response
            .get("price_rule")
            .cloned()
            .ok_or_else(|| PushError::new(store, "response had no price_rule"))
    }
}

fn discount_item(rule: Value, codes: Vec<String>) -> ListedItem {
    let title = rule
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let remote_id = id_string(&rule);
    ResourceItem::new(
        None,
        &title,
        remote_id,
        json!({ "price_rule": rule, "codes": codes }),
    )
    .into()
}

fn rule_of(item: &ResourceItem) -> &Value {
    item.payload.get("price_rule").unwrap_or(&Value::Null)
}

fn codes_of(item: &ResourceItem) -> Vec<String> {
    item.payload
        .get("codes")
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn code_set(item: &ResourceItem) -> BTreeSet<String> {
    codes_of(item).iter().map(|c| c.trim().to_uppercase()).collect()
}

/// Source codes not yet present in the target.
fn missing_codes(source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
    let existing = code_set(target);
    codes_of(source)
        .into_iter()
        .filter(|code| !existing.contains(&code.trim().to_uppercase()))
        .collect()
}

/// Price rule body for writing `rule` into another store.
///
/// Unset fields get Shopify's usual defaults. With no entitlements the rule
/// must target everything, so `target_selection` is forced to `all`.
fn rule_body(rule: &Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(
        "title".to_string(),
        rule.get("title").cloned().unwrap_or(Value::Null),
    );
    for field in RULE_FIELDS.iter().chain(ENTITLEMENT_FIELDS) {
        if let Some(value) = rule.get(*field).filter(|v| !v.is_null()) {
            body.insert((*field).to_string(), value.clone());
        }
    }
    for (field, default) in RULE_DEFAULTS {
        body.entry(*field).or_insert_with(|| json!(default));
    }
    body.entry("starts_at")
        .or_insert_with(|| json!(chrono::Utc::now().to_rfc3339()));
    for field in ENTITLEMENT_FIELDS {
        body.entry(*field).or_insert_with(|| json!([]));
    }

    let has_entitlements = ENTITLEMENT_FIELDS.iter().any(|field| {
        body.get(*field)
            .and_then(Value::as_array)
            .is_some_and(|ids| !ids.is_empty())
    });
    if !has_entitlements {
        body.insert("target_selection".to_string(), json!("all"));
    }
    body
}

#[async_trait]
impl ResourceAdapter for DiscountsAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Discounts
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::READ_WRITE
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        try_stream! {
            let mut rules = std::pin::pin!(rest_items(
                &self.client,
                store,
                "price_rules.json",
                "price_rules",
                None,
            ));

            while let Some(rule) = rules.try_next().await? {
                let codes = match id_string(&rule) {
                    Some(id) => {
                        let path = format!("price_rules/{id}/discount_codes.json");
                        rest_items(&self.client, store, &path, "discount_codes", None)
                            .try_filter_map(|code| {
                                future::ok(code.get("code").and_then(Value::as_str).map(str::to_string))
                            })
                            .try_collect::<Vec<_>>()
                            .await?
                    }
                    None => Vec::new(),
                };
                yield discount_item(rule, codes);
            }
        }
        .map_err(move |e: ShopifyError| FetchError::new(store, ResourceKind::Discounts, e))
        .boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        let mut changed = changed_fields(rule_of(source), rule_of(target), RULE_FIELDS);
        if !missing_codes(source, target).is_empty() {
            changed.push("codes".to_string());
        }
        changed
    }

    async fn create(
        &self,
        store: &StoreCredential,
        item: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let created = self
            .send_rule(store, Method::POST, "price_rules.json", rule_body(rule_of(item)))
            .await?;
        let rule_id = id_string(&created)
            .ok_or_else(|| PushError::new(store, "created price rule has no id"))?;

        let codes = codes_of(item);
        self.add_codes(store, &rule_id, &codes)
            .await
            .map_err(|e| PushError::new(store, format!("price rule created, but {e}")))?;

        match discount_item(created, codes) {
            ListedItem::Item(item) => Ok(item),
            ListedItem::Invalid(invalid) => Err(PushError::new(store, invalid.reason)),
        }
    }

    async fn update(
        &self,
        store: &StoreCredential,
        target: &ResourceItem,
        desired: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let rule_id = target
            .remote_id
            .as_deref()
            .ok_or_else(|| PushError::new(store, "target price rule has no id"))?;

        let mut body = rule_body(rule_of(desired));
        if let Some(id) = rule_of(target).get("id") {
            body.insert("id".to_string(), id.clone());
        }
        let updated = self
            .send_rule(store, Method::PUT, &format!("price_rules/{rule_id}.json"), body)
            .await?;

        let new_codes = missing_codes(desired, target);
        self.add_codes(store, rule_id, &new_codes).await?;

        let mut codes = codes_of(target);
        codes.extend(new_codes);
        match discount_item(updated, codes) {
            ListedItem::Item(item) => Ok(item),
            ListedItem::Invalid(invalid) => Err(PushError::new(store, invalid.reason)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn discount(rule: Value, codes: &[&str]) -> ResourceItem {
        match discount_item(rule, codes.iter().map(|c| (*c).to_string()).collect()) {
            ListedItem::Item(item) => item,
            ListedItem::Invalid(invalid) => panic!("invalid: {}", invalid.reason),
        }
    }

    fn adapter() -> DiscountsAdapter {
        DiscountsAdapter::new(ShopifyClient::new(&crate::config::ShopifyApiConfig::default()).unwrap())
    }

    #[test]
    fn test_keyed_by_title() {
        let item = discount(json!({"id": 5, "title": "SUMMER10", "value": "-10.0"}), &["SUMMER10"]);
        assert_eq!(item.identity_key, "summer10");
        assert_eq!(item.remote_id.as_deref(), Some("5"));
    }

    #[test]
    fn test_rule_body_defaults_and_forced_selection() {
        let body = rule_body(&json!({
            "id": 5,
            "title": "WELCOME",
            "value": "-15.0",
            "target_selection": "entitled",
            "starts_at": "2025-01-01T00:00:00Z",
            "created_at": "2025-01-01T00:00:00Z"
        }));

        assert_eq!(body["target_type"], "line_item");
        assert_eq!(body["allocation_method"], "across");
        assert_eq!(body["value_type"], "percentage");
        assert_eq!(body["customer_selection"], "all");
        assert_eq!(body["target_selection"], "all");
        assert_eq!(body["entitled_product_ids"], json!([]));
        assert!(!body.contains_key("id"));
        assert!(!body.contains_key("created_at"));
    }

    #[test]
    fn test_rule_body_keeps_entitled_selection() {
        let body = rule_body(&json!({
            "title": "SHIRTS",
            "value": "-5.0",
            "target_selection": "entitled",
            "entitled_collection_ids": [42]
        }));
        assert_eq!(body["target_selection"], "entitled");
        assert!(body.contains_key("starts_at"));
    }

    #[test]
    fn test_compare_codes_case_insensitive() {
        let source = discount(json!({"title": "A", "value": "-10.0"}), &["save10", "Extra"]);
        let target = discount(json!({"title": "A", "value": "-10.0"}), &["EXTRA", "SAVE10"]);
        assert!(adapter().compare(&source, &target).is_empty());
    }

    #[test]
    fn test_compare_value_and_codes() {
        let source = discount(json!({"title": "A", "value": "-20.0"}), &["SAVE20", "VIP"]);
        let target = discount(json!({"title": "A", "value": "-10.0"}), &["SAVE20"]);
        assert_eq!(adapter().compare(&source, &target), vec!["value", "codes"]);
        assert_eq!(missing_codes(&source, &target), vec!["VIP"]);
    }

    #[test]
    fn test_compare_tolerates_extra_target_codes() {
        let source = discount(json!({"title": "A", "value": "-10.0"}), &["A"]);
        let target = discount(json!({"title": "A", "value": "-10.0"}), &["a", "B"]);
        assert!(adapter().compare(&source, &target).is_empty());
    }

    #[test]
    fn test_updated_codes_match_on_next_compare() {
        let source = discount(json!({"title": "A", "value": "-10.0"}), &["A", "VIP"]);
        let target = discount(json!({"title": "A", "value": "-10.0"}), &["A", "B"]);
        assert_eq!(adapter().compare(&source, &target), vec!["codes"]);

        let mut codes = codes_of(&target);
        codes.extend(missing_codes(&source, &target));
        let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
        let after_update = discount(json!({"title": "A", "value": "-10.0"}), &refs);

        assert!(adapter().compare(&source, &after_update).is_empty());
    }
}
