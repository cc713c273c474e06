//! Resource kinds and items.
//!
//! A [`ResourceItem`] is the uniform shape every adapter presents outward,
//! regardless of whether the backing Shopify resource is a REST collection,
//! a GraphQL menu, or a theme asset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of Shopify resource that can be reconciled between stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Collections,
    Products,
    Menus,
    Locations,
    ShippingZones,
    Discounts,
    Tags,
    ThemeSettings,
    ShopSettings,
}

impl ResourceKind {
    /// Every supported kind, in dashboard display order.
    pub const ALL: [Self; 9] = [
        Self::Collections,
        Self::Products,
        Self::Menus,
        Self::Locations,
        Self::ShippingZones,
        Self::Discounts,
        Self::Tags,
        Self::ThemeSettings,
        Self::ShopSettings,
    ];

    /// URL slug for the kind.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Collections => "collections",
            Self::Products => "products",
            Self::Menus => "menus",
            Self::Locations => "locations",
            Self::ShippingZones => "shipping-zones",
            Self::Discounts => "discounts",
            Self::Tags => "tags",
            Self::ThemeSettings => "theme-settings",
            Self::ShopSettings => "shop-settings",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when a caller names a resource kind that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown resource kind: {0}")]
pub struct UnknownResourceError(pub String);

impl std::str::FromStr for ResourceKind {
    type Err = UnknownResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let normalized = match normalized.as_str() {
            "shipping" => "shipping-zones",
            "settings" => "shop-settings",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == normalized)
            .ok_or_else(|| UnknownResourceError(s.to_string()))
    }
}

/// Derive the identity key used to match items across stores.
///
/// Lowercased, trimmed handle; falls back to the lowercased, trimmed title
/// when the handle is absent or blank. Returns `None` when both are blank.
#[must_use]
pub fn identity_key(handle: Option<&str>, title: Option<&str>) -> Option<String> {
    [handle, title]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// A single resource normalized for diffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    /// Case-insensitive join key.
    pub identity_key: String,
    /// Title shown in reports.
    pub title: String,
    /// Store-specific ID (REST numeric ID or GraphQL GID), used for updates.
    pub remote_id: Option<String>,
    /// Resource-specific body, as returned by Shopify.
    pub payload: serde_json::Value,
}

impl ResourceItem {
    /// Build an item, deriving its identity key from handle and title.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidItem`] when neither handle nor title yields a key.
    pub fn new(
        handle: Option<&str>,
        title: &str,
        remote_id: Option<String>,
        payload: serde_json::Value,
    ) -> Result<Self, InvalidItem> {
        let identity_key = identity_key(handle, Some(title)).ok_or_else(|| InvalidItem {
            title: title.to_string(),
            remote_id: remote_id.clone(),
            reason: "item has neither a handle nor a title".to_string(),
        })?;

        Ok(Self {
            identity_key,
            title: title.trim().to_string(),
            remote_id,
            payload,
        })
    }

    /// Build an item with an explicit, already-normalized key.
    ///
    /// Used for singleton resources (theme settings, shop settings) whose
    /// identity does not come from a handle.
    #[must_use]
    pub fn singleton(
        key: &str,
        title: &str,
        remote_id: Option<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            identity_key: key.trim().to_lowercase(),
            title: title.to_string(),
            remote_id,
            payload,
        }
    }

    /// Read a string field from the payload.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(serde_json::Value::as_str)
    }
}

/// An item that could not be keyed and was excluded from the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidItem {
    /// Whatever title the item had (may be blank).
    pub title: String,
    /// Store-specific ID, if present.
    pub remote_id: Option<String>,
    /// Why the item was excluded.
    pub reason: String,
}

/// One element produced while listing a store.
#[derive(Debug, Clone, PartialEq)]
pub enum ListedItem {
    /// A well-formed, keyed item.
    Item(ResourceItem),
    /// An item excluded from the diff.
    Invalid(InvalidItem),
}

impl From<Result<ResourceItem, InvalidItem>> for ListedItem {
    fn from(result: Result<ResourceItem, InvalidItem>) -> Self {
        match result {
            Ok(item) => Self::Item(item),
            Err(invalid) => Self::Invalid(invalid),
        }
    }
}

/// The full result of listing one store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    /// Keyed items, in the order the store returned them.
    pub items: Vec<ResourceItem>,
    /// Items excluded from the diff.
    pub invalid: Vec<InvalidItem>,
}

impl Listing {
    /// Total number of listed entries, valid or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.invalid.len()
    }

    /// Whether nothing was listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.invalid.is_empty()
    }

    /// Append one listed entry.
    pub fn push(&mut self, listed: ListedItem) {
        match listed {
            ListedItem::Item(item) => self.items.push(item),
            ListedItem::Invalid(invalid) => self.invalid.push(invalid),
        }
    }
}

impl FromIterator<ListedItem> for Listing {
    fn from_iter<I: IntoIterator<Item = ListedItem>>(iter: I) -> Self {
        let mut listing = Self::default();
        for listed in iter {
            listing.push(listed);
        }
        listing
    }
}

impl From<Vec<ResourceItem>> for Listing {
    fn from(items: Vec<ResourceItem>) -> Self {
        Self {
            items,
            invalid: Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_key_prefers_handle() {
        assert_eq!(
            identity_key(Some("Summer-Sale"), Some("Something Else")),
            Some("summer-sale".to_string())
        );
    }

    #[test]
    fn test_identity_key_falls_back_to_title() {
        assert_eq!(
            identity_key(None, Some("  Gift Cards ")),
            Some("gift cards".to_string())
        );
        assert_eq!(
            identity_key(Some("   "), Some("Gift Cards")),
            Some("gift cards".to_string())
        );
    }

    #[test]
    fn test_identity_key_blank() {
        assert_eq!(identity_key(None, None), None);
        assert_eq!(identity_key(Some(""), Some("  ")), None);
    }

    #[test]
    fn test_identity_key_is_case_and_whitespace_insensitive() {
        let a = identity_key(Some(" Frontpage "), None);
        let b = identity_key(Some("FRONTPAGE"), None);
        assert_eq!(a, b);
        assert_eq!(a, identity_key(a.as_deref(), None));
    }

    #[test]
    fn test_resource_item_new_invalid() {
        let err = ResourceItem::new(None, "   ", Some("42".to_string()), json!({})).unwrap_err();
        assert_eq!(err.remote_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_resource_item_singleton() {
        let item = ResourceItem::singleton("Config/Settings_Data.json", "Theme", None, json!({}));
        assert_eq!(item.identity_key, "config/settings_data.json");
    }

    #[test]
    fn test_resource_kind_parse() {
        assert_eq!(
            "shipping-zones".parse::<ResourceKind>().unwrap(),
            ResourceKind::ShippingZones
        );
        assert_eq!(
            "theme_settings".parse::<ResourceKind>().unwrap(),
            ResourceKind::ThemeSettings
        );
        assert_eq!(
            "shipping".parse::<ResourceKind>().unwrap(),
            ResourceKind::ShippingZones
        );
        assert_eq!(
            "widgets".parse::<ResourceKind>().unwrap_err(),
            UnknownResourceError("widgets".to_string())
        );
    }

    #[test]
    fn test_resource_kind_slug_round_trips() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.slug().parse::<ResourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_listing_collects_valid_and_invalid() {
        let listing: Listing = vec![
            ListedItem::from(ResourceItem::new(Some("a"), "A", None, json!({}))),
            ListedItem::from(ResourceItem::new(None, "", None, json!({}))),
        ]
        .into_iter()
        .collect();

        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.invalid.len(), 1);
        assert_eq!(listing.len(), 2);
    }
}
