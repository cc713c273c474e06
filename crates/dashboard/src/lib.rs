//! Shop Sync dashboard library.
//!
//! Reconciles resources between a staging and a production Shopify store:
//! lists both sides through a [`sync::ResourceAdapter`], diffs them by
//! identity key and pushes missing or differing items to the target.
//!
//! The binary in `main.rs` serves the HTTP API; the CLI drives
//! [`sync::SyncOrchestrator`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod adapters;
pub mod backup;
pub mod config;
pub mod error;
pub mod routes;
pub mod shopify;
pub mod state;
pub mod sync;

pub use config::SyncConfig;
pub use error::{SyncError, SyncFailure};
pub use state::AppState;
