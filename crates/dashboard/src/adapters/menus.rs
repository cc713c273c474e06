//! Navigation menus (GraphQL).
//!
//! Menus are keyed by handle. Items are sub-diffed by title: an update
//! keeps every item already in the target and appends the source items it
//! lacks, so nothing added directly in the target is lost.

use async_trait::async_trait;
use futures::StreamExt;
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential};

use crate::shopify::{
    ShopifyClient, ShopifyError, check_user_errors,
    pagination::graphql_nodes,
    queries::{
        GetMenus, Menu, MenuCreate, MenuCreateVariables, MenuItem, MenuMutationPayload,
        MenuUpdate, MenuUpdateVariables, PageVariables,
    },
};
use crate::sync::{Capabilities, FetchError, ItemStream, PushError, ResourceAdapter};

pub struct MenusAdapter {
    client: ShopifyClient,
}

impl MenusAdapter {
    #[must_use]
    pub const fn new(client: ShopifyClient) -> Self {
        Self { client }
    }
}

fn menu_item(menu: &Menu) -> Result<ListedItem, serde_json::Error> {
    let payload = serde_json::to_value(menu)?;
    Ok(ResourceItem::new(Some(&menu.handle), &menu.title, Some(menu.id.clone()), payload).into())
}

fn decode(item: &ResourceItem) -> Result<Menu, serde_json::Error> {
    serde_json::from_value(item.payload.clone())
}

/// Source items whose title has no case-insensitive match in the target.
fn missing_items<'a>(source: &'a Menu, target: &Menu) -> Vec<&'a MenuItem> {
    source
        .items
        .iter()
        .filter(|item| {
            !target
                .items
                .iter()
                .any(|existing| existing.title.trim().eq_ignore_ascii_case(item.title.trim()))
        })
        .collect()
}

/// Copy of an item tree that can be created in another store.
///
/// Store IDs are dropped. Items linked to a resource by ID become plain
/// URL links, since the resource has a different ID in the other store.
fn portable(item: &MenuItem) -> MenuItem {
    let linked_by_id = item.resource_id.is_some() && item.url.is_some();
    MenuItem {
        id: None,
        title: item.title.clone(),
        item_type: if linked_by_id {
            "HTTP".to_string()
        } else {
            item.item_type.clone()
        },
        url: item.url.clone(),
        resource_id: None,
        tags: item.tags.clone(),
        items: item.items.iter().map(portable).collect(),
    }
}

fn mutation_result(
    store: &StoreCredential,
    payload: MenuMutationPayload,
) -> Result<ResourceItem, PushError> {
    check_user_errors(&payload.user_errors).map_err(|e| PushError::new(store, e))?;
    let menu = payload
        .menu
        .ok_or_else(|| PushError::new(store, "mutation returned no menu"))?;
    match menu_item(&menu).map_err(|e| PushError::new(store, e))? {
        ListedItem::Item(item) => Ok(item),
        ListedItem::Invalid(invalid) => Err(PushError::new(store, invalid.reason)),
    }
}

#[async_trait]
impl ResourceAdapter for MenusAdapter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Menus
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::READ_WRITE
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        graphql_nodes::<GetMenus, _, _, _>(&self.client, store, PageVariables::after, |data| {
            data.menus
        })
        .map(move |menu| {
            menu.and_then(|menu| menu_item(&menu).map_err(ShopifyError::from))
                .map_err(|e| FetchError::new(store, ResourceKind::Menus, e))
        })
        .boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        let (Ok(source), Ok(target)) = (decode(source), decode(target)) else {
            return if source.payload == target.payload {
                Vec::new()
            } else {
                vec!["items".to_string()]
            };
        };

        let mut changed = Vec::new();
        if source.title.trim() != target.title.trim() {
            changed.push("title".to_string());
        }
        if !missing_items(&source, &target).is_empty() {
            changed.push("items".to_string());
        }
        changed
    }

    async fn create(
        &self,
        store: &StoreCredential,
        item: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let source = decode(item).map_err(|e| PushError::new(store, e))?;
        let variables = MenuCreateVariables {
            title: source.title.clone(),
            handle: source.handle.clone(),
            items: source.items.iter().map(portable).collect(),
        };

        let data = self
            .client
            .execute::<MenuCreate>(store, variables)
            .await
            .map_err(|e| PushError::new(store, e))?;
        mutation_result(store, data.menu_create)
    }

    async fn update(
        &self,
        store: &StoreCredential,
        target: &ResourceItem,
        desired: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let existing = decode(target).map_err(|e| PushError::new(store, e))?;
        let source = decode(desired).map_err(|e| PushError::new(store, e))?;

        let mut items = existing.items.clone();
        items.extend(missing_items(&source, &existing).into_iter().map(portable));

        let variables = MenuUpdateVariables {
            id: existing.id.clone(),
            title: source.title.clone(),
            handle: existing.handle.clone(),
            items,
        };

        let data = self
            .client
            .execute::<MenuUpdate>(store, variables)
            .await
            .map_err(|e| PushError::new(store, e))?;
        mutation_result(store, data.menu_update)
    }
}
