//! Diff and apply.
//!
//! [`diff`] classifies source items against the target by identity key.
//! [`apply`] drives creates and updates through a [`WriteScheduler`]:
//! a bounded number of writes in flight, a steady rate against the target
//! store, and a timeout on every write. Each item is independent; one
//! failure or timeout never stops the rest.

use std::collections::HashMap;
use std::future::Future;
use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

use futures::{StreamExt, stream};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use shop_sync_core::{
    DiffEntry, DiffResult, DifferingItem, Listing, OutcomeStatus, ResourceItem, StoreCredential,
    SyncDirection, SyncOutcome, SyncReport,
};
use tracing::instrument;

use super::adapter::{Capabilities, ResourceAdapter};
use super::error::PushError;

/// Throttling for writes against one target store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePolicy {
    /// Writes allowed in flight at once.
    pub max_concurrent_writes: NonZeroUsize,
    /// Sustained write rate; bursts up to this many.
    pub writes_per_second: NonZeroU32,
    /// Per-write deadline.
    pub write_timeout: Duration,
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self {
            max_concurrent_writes: NonZeroUsize::MIN.saturating_add(1),
            writes_per_second: NonZeroU32::MIN.saturating_add(1),
            write_timeout: Duration::from_secs(30),
        }
    }
}

/// Rate gate plus timeout, shared by every write of one apply.
pub struct WriteScheduler {
    limiter: DefaultDirectRateLimiter,
    timeout: Duration,
}

impl WriteScheduler {
    #[must_use]
    pub fn new(policy: &WritePolicy) -> Self {
        Self {
            limiter: RateLimiter::direct(Quota::per_second(policy.writes_per_second)),
            timeout: policy.write_timeout,
        }
    }

    /// Wait for a rate-limit permit, then run `write` under the timeout.
    ///
    /// # Errors
    ///
    /// Returns the write's own error, or a timeout [`PushError`].
    pub async fn write<F>(&self, store: &StoreCredential, write: F) -> Result<ResourceItem, PushError>
    where
        F: Future<Output = Result<ResourceItem, PushError>>,
    {
        self.limiter.until_ready().await;
        tokio::time::timeout(self.timeout, write)
            .await
            .unwrap_or_else(|_| Err(PushError::timed_out(store, self.timeout)))
    }
}

/// Classify every source item against the target.
///
/// Target items are indexed by identity key; when the target holds several
/// items with the same key, the first one listed wins. Keyed source items
/// keep their listing order and are followed by the source's invalid items.
pub fn diff<F>(source: Listing, target: &Listing, compare: F) -> DiffResult
where
    F: Fn(&ResourceItem, &ResourceItem) -> Vec<String>,
{
    let mut by_key: HashMap<&str, &ResourceItem> = HashMap::with_capacity(target.items.len());
    for item in &target.items {
        by_key.entry(item.identity_key.as_str()).or_insert(item);
    }

    let mut entries = Vec::with_capacity(source.len());
    for item in source.items {
        let entry = match by_key.get(item.identity_key.as_str()).copied() {
            None => DiffEntry::Missing(item),
            Some(target_item) => {
                let changed_fields = compare(&item, target_item);
                if changed_fields.is_empty() {
                    DiffEntry::Matching(item)
                } else {
                    DiffEntry::Differing(DifferingItem {
                        source: item,
                        target: target_item.clone(),
                        changed_fields,
                    })
                }
            }
        };
        entries.push(entry);
    }
    entries.extend(source.invalid.into_iter().map(DiffEntry::Invalid));

    DiffResult::new(entries)
}

/// Push a diff into the target store and report per-item outcomes.
///
/// Outcomes are returned in diff order regardless of which writes finish
/// first.
#[instrument(skip_all, fields(kind = %adapter.kind(), target = %target.domain(), entries = diff.entries().len()))]
pub async fn apply(
    diff: DiffResult,
    target: &StoreCredential,
    adapter: &dyn ResourceAdapter,
    policy: &WritePolicy,
    direction: SyncDirection,
) -> SyncReport {
    let scheduler = WriteScheduler::new(policy);
    let capabilities = adapter.capabilities();

    let outcomes: Vec<SyncOutcome> = stream::iter(diff.into_entries())
        .map(|entry| reconcile_entry(entry, target, adapter, capabilities, &scheduler))
        .buffered(policy.max_concurrent_writes.get())
        .collect()
        .await;

    let report = SyncReport::from_outcomes(adapter.kind(), direction, outcomes);
    tracing::info!(
        synced = report.total_synced,
        failed = report.total_failed,
        "{}",
        report.message
    );
    report
}

async fn reconcile_entry(
    entry: DiffEntry,
    target: &StoreCredential,
    adapter: &dyn ResourceAdapter,
    capabilities: Capabilities,
    scheduler: &WriteScheduler,
) -> SyncOutcome {
    match entry {
        DiffEntry::Matching(item) => {
            SyncOutcome::new(Some(item.identity_key), item.title, OutcomeStatus::Unchanged)
        }
        DiffEntry::Invalid(invalid) => {
            SyncOutcome::new(None, invalid.title, OutcomeStatus::Invalid(invalid.reason))
        }
        DiffEntry::Missing(item) => {
            let status = if capabilities.create {
                match scheduler.write(target, adapter.create(target, &item)).await {
                    Ok(created) => {
                        tracing::debug!(key = %created.identity_key, "created");
                        OutcomeStatus::Created
                    }
                    Err(e) => {
                        tracing::warn!(key = %item.identity_key, error = %e, "create failed");
                        OutcomeStatus::Failed(e.to_string())
                    }
                }
            } else {
                OutcomeStatus::ManualActionRequired(adapter.missing_reason())
            };
            SyncOutcome::new(Some(item.identity_key), item.title, status)
        }
        DiffEntry::Differing(differing) => {
            let status = if capabilities.update {
                match scheduler
                    .write(
                        target,
                        adapter.update(target, &differing.target, &differing.source),
                    )
                    .await
                {
                    Ok(_) => OutcomeStatus::Updated,
                    Err(e) => {
                        tracing::warn!(key = %differing.source.identity_key, error = %e, "update failed");
                        OutcomeStatus::Failed(e.to_string())
                    }
                }
            } else {
                OutcomeStatus::ManualActionRequired(
                    adapter.differing_reason(&differing.changed_fields),
                )
            };
            SyncOutcome::new(
                Some(differing.source.identity_key),
                differing.source.title,
                status,
            )
            .with_changed_fields(differing.changed_fields)
        }
    }
}
