//! Resource adapter contract and registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential, UnknownResourceError};

use super::error::{FetchError, PushError};

/// Lazy listing of one store. Each call to [`ResourceAdapter::list`] starts
/// from the first page.
pub type ItemStream<'a> = BoxStream<'a, Result<ListedItem, FetchError>>;

/// What an adapter can write.
///
/// Missing items of a kind without `create`, and differing items of a kind
/// without `update`, are reported as needing manual action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Capabilities {
    pub create: bool,
    pub update: bool,
}

impl Capabilities {
    pub const READ_WRITE: Self = Self {
        create: true,
        update: true,
    };
    pub const UPDATE_ONLY: Self = Self {
        create: false,
        update: true,
    };
    pub const REPORT_ONLY: Self = Self {
        create: false,
        update: false,
    };
}

/// Per-kind translator between a Shopify store and [`ResourceItem`]s.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    fn kind(&self) -> ResourceKind;

    fn capabilities(&self) -> Capabilities;

    /// Stream every item in `store`, following pagination to the end.
    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a>;

    /// Names of the fields that differ between a source and target item.
    /// Empty means the items match.
    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String>;

    /// Create `item` in `store`.
    async fn create(
        &self,
        store: &StoreCredential,
        item: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let _ = item;
        Err(PushError::unsupported(store, self.kind(), "create"))
    }

    /// Bring `target` (an item already in `store`) in line with `desired`.
    async fn update(
        &self,
        store: &StoreCredential,
        target: &ResourceItem,
        desired: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let _ = (target, desired);
        Err(PushError::unsupported(store, self.kind(), "update"))
    }

    /// Reason shown for a missing item this adapter cannot create.
    fn missing_reason(&self) -> String {
        "missing in target store, create manually".to_string()
    }

    /// Reason shown for a differing item this adapter cannot update.
    fn differing_reason(&self, changed_fields: &[String]) -> String {
        format!("differs in {}, update manually", changed_fields.join(", "))
    }
}

/// Adapters by kind.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<ResourceKind, Arc<dyn ResourceAdapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.adapters.keys()).finish()
    }
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter, replacing any existing one for the same kind.
    #[must_use]
    pub fn with(mut self, adapter: impl ResourceAdapter + 'static) -> Self {
        self.register(Arc::new(adapter));
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn ResourceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    /// Adapter for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownResourceError`] when no adapter is registered.
    pub fn get(&self, kind: ResourceKind) -> Result<Arc<dyn ResourceAdapter>, UnknownResourceError> {
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| UnknownResourceError(kind.to_string()))
    }

    /// Registered kinds with their capabilities.
    pub fn kinds(&self) -> impl Iterator<Item = (ResourceKind, Capabilities)> + '_ {
        self.adapters
            .iter()
            .map(|(kind, adapter)| (*kind, adapter.capabilities()))
    }
}
