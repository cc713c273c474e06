//! Entry point for the HTTP and CLI layers.

use futures::TryStreamExt;
use serde::Serialize;
use shop_sync_core::{
    DiffResult, DiffSummary, Listing, ResourceKind, StoreCredential, SyncDirection, SyncReport,
};
use tracing::instrument;

use crate::error::SyncError;

use super::adapter::{AdapterRegistry, Capabilities, ResourceAdapter};
use super::direction::{ResolvedStores, StoreRoles, resolve};
use super::error::FetchError;
use super::reconcile::{WritePolicy, apply, diff};

/// Read-only result of diffing one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffPreview {
    pub kind: ResourceKind,
    pub direction: SyncDirection,
    pub source: String,
    pub target: String,
    pub capabilities: Capabilities,
    #[serde(flatten)]
    pub summary: DiffSummary,
}

/// Wires direction resolution, adapters and the reconciler together.
///
/// Holds no per-run state; concurrent runs share nothing but the registry
/// and configuration.
#[derive(Debug, Clone)]
pub struct SyncOrchestrator {
    registry: AdapterRegistry,
    stores: StoreRoles,
    write_policy: WritePolicy,
}

impl SyncOrchestrator {
    #[must_use]
    pub const fn new(registry: AdapterRegistry, stores: StoreRoles, write_policy: WritePolicy) -> Self {
        Self {
            registry,
            stores,
            write_policy,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn stores(&self) -> &StoreRoles {
        &self.stores
    }

    /// Sync one kind in one direction.
    ///
    /// Credentials are validated before the adapter is touched. Listing is
    /// all-or-nothing; once both sides are listed, per-item failures are
    /// recorded in the report instead of failing the run.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`], [`SyncError::UnknownResource`] or
    /// [`SyncError::Fetch`].
    #[instrument(skip(self))]
    pub async fn run(
        &self,
        kind: ResourceKind,
        direction: SyncDirection,
    ) -> Result<SyncReport, SyncError> {
        let stores = resolve(direction, &self.stores)?;
        let adapter = self.registry.get(kind)?;

        let diff = diff_stores(adapter.as_ref(), &stores).await?;
        Ok(apply(
            diff,
            &stores.target,
            adapter.as_ref(),
            &self.write_policy,
            direction,
        )
        .await)
    }

    /// Like [`run`](Self::run), but fatal errors become a failure report.
    pub async fn run_report(&self, kind: ResourceKind, direction: SyncDirection) -> SyncReport {
        match self.run(kind, direction).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(%kind, %direction, error = %e, "Sync aborted");
                e.into_report(Some(kind), direction)
            }
        }
    }

    /// Diff one kind without writing anything.
    ///
    /// # Errors
    ///
    /// Same fatal errors as [`run`](Self::run).
    #[instrument(skip(self))]
    pub async fn preview(
        &self,
        kind: ResourceKind,
        direction: SyncDirection,
    ) -> Result<DiffPreview, SyncError> {
        let stores = resolve(direction, &self.stores)?;
        let adapter = self.registry.get(kind)?;

        let diff = diff_stores(adapter.as_ref(), &stores).await?;
        Ok(DiffPreview {
            kind,
            direction,
            source: stores.source.domain().to_string(),
            target: stores.target.domain().to_string(),
            capabilities: adapter.capabilities(),
            summary: diff.summary(),
        })
    }
}

/// List both sides concurrently and diff them.
async fn diff_stores(
    adapter: &dyn ResourceAdapter,
    stores: &ResolvedStores,
) -> Result<DiffResult, FetchError> {
    let (source, target) = tokio::try_join!(
        collect_listing(adapter, &stores.source),
        collect_listing(adapter, &stores.target)
    )?;

    tracing::debug!(
        source = source.len(),
        target = target.len(),
        "Listed both stores"
    );
    Ok(diff(source, &target, |s, t| adapter.compare(s, t)))
}

/// Drain an adapter's listing for one store.
///
/// # Errors
///
/// Returns the first [`FetchError`]; items already listed are discarded.
pub async fn collect_listing(
    adapter: &dyn ResourceAdapter,
    store: &StoreCredential,
) -> Result<Listing, FetchError> {
    adapter
        .list(store)
        .try_fold(Listing::default(), |mut listing, listed| async move {
            listing.push(listed);
            Ok(listing)
        })
        .await
}
