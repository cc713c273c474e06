//! Integration test support for Shop Sync.
//!
//! [`MemoryAdapter`] is an in-memory [`ResourceAdapter`] keyed by store
//! domain. Tests seed both stores, inject list or write failures and
//! write delays, then drive the real orchestrator against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-sync-integration-tests
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use secrecy::SecretString;
use serde_json::json;
use shop_sync_core::{ListedItem, ResourceItem, ResourceKind, StoreCredential, SyncDirection};
use shop_sync_dashboard::sync::{
    AdapterRegistry, Capabilities, FetchError, ItemStream, PushError, ResourceAdapter,
    RoleCredentials, StoreRoles, SyncOrchestrator, WritePolicy,
};

pub const STAGE: &str = "stage.myshopify.com";
pub const PROD: &str = "prod.myshopify.com";

/// Both roles configured with the test domains.
#[must_use]
pub fn store_roles() -> StoreRoles {
    StoreRoles {
        stage: role(STAGE, "shpat_stage_3f9a1c27be04d85e"),
        prod: role(PROD, "shpat_prod_6a1f0c9b72d4e318"),
    }
}

/// Credentials for one role.
#[must_use]
pub fn role(domain: &str, token: &str) -> RoleCredentials {
    RoleCredentials {
        domain: Some(domain.to_string()),
        access_token: Some(SecretString::from(token.to_string())),
        theme_id: None,
    }
}

/// Fast write policy for tests.
#[must_use]
pub const fn fast_policy(concurrency: usize, timeout: Duration) -> WritePolicy {
    WritePolicy {
        max_concurrent_writes: match std::num::NonZeroUsize::new(concurrency) {
            Some(n) => n,
            None => std::num::NonZeroUsize::MIN,
        },
        writes_per_second: match std::num::NonZeroU32::new(1000) {
            Some(n) => n,
            None => std::num::NonZeroU32::MIN,
        },
        write_timeout: timeout,
    }
}

/// Orchestrator over a single memory adapter.
#[must_use]
pub fn orchestrator(adapter: &Arc<MemoryAdapter>, stores: StoreRoles, policy: WritePolicy) -> SyncOrchestrator {
    let mut registry = AdapterRegistry::new();
    registry.register(adapter.clone());
    SyncOrchestrator::new(registry, stores, policy)
}

/// Source domain for `direction` with the default test roles.
#[must_use]
pub const fn source_domain(direction: SyncDirection) -> &'static str {
    match direction {
        SyncDirection::StageToProd => STAGE,
        SyncDirection::ProdToStage => PROD,
    }
}

/// Build a keyed item with a `body` field.
///
/// # Panics
///
/// Panics if both handle and title are blank.
#[must_use]
#[allow(clippy::expect_used)]
pub fn item(handle: &str, title: &str, body: &str) -> ResourceItem {
    ResourceItem::new(Some(handle), title, None, json!({ "body": body }))
        .expect("test items need a handle or title")
}

/// Build an entry with neither handle nor title.
#[must_use]
pub fn invalid(remote_id: &str) -> ListedItem {
    ResourceItem::new(None, "  ", Some(remote_id.to_string()), json!({})).into()
}

/// Call counters.
#[derive(Debug, Default)]
pub struct Calls {
    pub lists: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Calls {
    #[must_use]
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// In-memory stores behind the adapter contract.
pub struct MemoryAdapter {
    kind: ResourceKind,
    capabilities: Capabilities,
    stores: Mutex<HashMap<String, Vec<ListedItem>>>,
    failing_lists: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    next_id: AtomicUsize,
    pub calls: Calls,
}

impl MemoryAdapter {
    #[must_use]
    pub fn new(kind: ResourceKind, capabilities: Capabilities) -> Arc<Self> {
        Arc::new(Self {
            kind,
            capabilities,
            stores: Mutex::default(),
            failing_lists: Mutex::default(),
            failing_writes: Mutex::default(),
            delays: Mutex::default(),
            next_id: AtomicUsize::new(1),
            calls: Calls::default(),
        })
    }

    /// A create-and-update adapter for collections.
    #[must_use]
    pub fn read_write() -> Arc<Self> {
        Self::new(ResourceKind::Collections, Capabilities::READ_WRITE)
    }

    /// Replace the contents of one store.
    pub fn seed(&self, domain: &str, items: impl IntoIterator<Item = ListedItem>) {
        lock(&self.stores).insert(domain.to_string(), items.into_iter().collect());
    }

    /// Seed one store with keyed items.
    pub fn seed_items(&self, domain: &str, items: impl IntoIterator<Item = ResourceItem>) {
        self.seed(domain, items.into_iter().map(ListedItem::Item));
    }

    /// Keyed items currently in one store.
    #[must_use]
    pub fn items(&self, domain: &str) -> Vec<ResourceItem> {
        lock(&self.stores)
            .get(domain)
            .into_iter()
            .flatten()
            .filter_map(|listed| match listed {
                ListedItem::Item(item) => Some(item.clone()),
                ListedItem::Invalid(_) => None,
            })
            .collect()
    }

    /// Listing `domain` yields its items, then an error.
    pub fn fail_list(&self, domain: &str) {
        lock(&self.failing_lists).insert(domain.to_string());
    }

    /// Writes of the item with this identity key fail.
    pub fn fail_write(&self, key: &str) {
        lock(&self.failing_writes).insert(key.to_string());
    }

    /// Writes of the item with this identity key sleep first.
    pub fn delay_write(&self, key: &str, delay: Duration) {
        lock(&self.delays).insert(key.to_string(), delay);
    }

    async fn write(
        &self,
        store: &StoreCredential,
        key: &str,
        apply: impl FnOnce(&mut Vec<ListedItem>) -> ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        let in_flight = self.calls.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let delay = lock(&self.delays).get(key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = if lock(&self.failing_writes).contains(key) {
            Err(PushError::new(store, format!("HTTP 422: {key} rejected")))
        } else {
            let mut stores = lock(&self.stores);
            Ok(apply(stores.entry(store.domain().to_string()).or_default()))
        };

        self.calls.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl ResourceAdapter for MemoryAdapter {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn list<'a>(&'a self, store: &'a StoreCredential) -> ItemStream<'a> {
        self.calls.lists.fetch_add(1, Ordering::SeqCst);

        let mut results: Vec<Result<ListedItem, FetchError>> = lock(&self.stores)
            .get(store.domain())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(Ok)
            .collect();
        if lock(&self.failing_lists).contains(store.domain()) {
            results.push(Err(FetchError::new(store, self.kind, "HTTP 500: upstream error")));
        }

        stream::iter(results).boxed()
    }

    fn compare(&self, source: &ResourceItem, target: &ResourceItem) -> Vec<String> {
        if source.payload.get("body") == target.payload.get("body") {
            Vec::new()
        } else {
            vec!["body".to_string()]
        }
    }

    async fn create(
        &self,
        store: &StoreCredential,
        item: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        self.calls.creates.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.write(store, &item.identity_key, |items| {
            let mut created = item.clone();
            created.remote_id = Some(format!("gid://memory/{id}"));
            items.push(ListedItem::Item(created.clone()));
            created
        })
        .await
    }

    async fn update(
        &self,
        store: &StoreCredential,
        target: &ResourceItem,
        desired: &ResourceItem,
    ) -> Result<ResourceItem, PushError> {
        self.calls.updates.fetch_add(1, Ordering::SeqCst);
        self.write(store, &target.identity_key, |items| {
            let mut updated = target.clone();
            updated.payload = desired.payload.clone();
            for listed in items.iter_mut() {
                if let ListedItem::Item(existing) = listed
                    && existing.identity_key == target.identity_key
                {
                    *existing = updated.clone();
                    break;
                }
            }
            updated
        })
        .await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
