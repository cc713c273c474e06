//! Resource diff-and-reconcile engine.
//!
//! - [`adapter`]: per-kind list/compare/create/update contract
//! - [`reconcile`]: diffing and throttled apply
//! - [`direction`]: direction to (source, target) resolution
//! - [`orchestrator`]: the single entry point used by routes and the CLI

pub mod adapter;
pub mod direction;
mod error;
pub mod orchestrator;
pub mod reconcile;

pub use adapter::{AdapterRegistry, Capabilities, ItemStream, ResourceAdapter};
pub use direction::{ResolvedStores, RoleCredentials, StoreRoles, resolve};
pub use error::{FetchError, PushError};
pub use orchestrator::{DiffPreview, SyncOrchestrator, collect_listing};
pub use reconcile::{WritePolicy, WriteScheduler, apply, diff};
