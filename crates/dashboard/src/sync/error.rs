//! Listing and write failures.
//!
//! A [`FetchError`] aborts the whole run; a [`PushError`] is recorded
//! against one item and the run carries on.

use std::time::Duration;

use shop_sync_core::{ResourceKind, StoreCredential};
use thiserror::Error;

/// Listing one side of a sync failed. Fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to list {kind} from {store}: {message}")]
pub struct FetchError {
    /// Domain of the store that failed.
    pub store: String,
    pub kind: ResourceKind,
    /// Underlying error, including any raw response body.
    pub message: String,
}

impl FetchError {
    #[must_use]
    pub fn new(store: &StoreCredential, kind: ResourceKind, err: impl std::fmt::Display) -> Self {
        Self {
            store: store.domain().to_string(),
            kind,
            message: err.to_string(),
        }
    }
}

/// Creating or updating one item failed. Recorded as that item's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PushError {
    /// Domain of the target store.
    pub store: String,
    pub message: String,
}

impl PushError {
    #[must_use]
    pub fn new(store: &StoreCredential, err: impl std::fmt::Display) -> Self {
        Self {
            store: store.domain().to_string(),
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn unsupported(store: &StoreCredential, kind: ResourceKind, operation: &str) -> Self {
        Self::new(store, format!("{kind} do not support {operation}"))
    }

    #[must_use]
    pub fn timed_out(store: &StoreCredential, after: Duration) -> Self {
        Self::new(store, format!("timed out after {}s", after.as_secs_f32()))
    }
}
