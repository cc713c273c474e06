//! Shop Sync Core - Shared domain types.
//!
//! This crate provides the types shared by every Shop Sync component:
//! - `dashboard` - Reconciliation engine and HTTP surface
//! - `cli` - Command-line entry point to the same engine
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Identity-key derivation lives here so the source and target
//! sides of a diff are always keyed by the same code.
//!
//! # Modules
//!
//! - [`types`] - Credentials, directions, resource items, diffs and reports

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
