//! Core types for Shop Sync.
//!
//! This module provides type-safe wrappers for the reconciliation domain.

pub mod credential;
pub mod diff;
pub mod direction;
pub mod report;
pub mod resource;

pub use credential::StoreCredential;
pub use diff::{DiffEntry, DiffResult, DiffSummary, DifferingItem, DifferingSummary};
pub use direction::{StoreRole, SyncDirection};
pub use report::{OutcomeStatus, SyncOutcome, SyncReport};
pub use resource::{
    InvalidItem, ListedItem, Listing, ResourceItem, ResourceKind, UnknownResourceError,
    identity_key,
};
