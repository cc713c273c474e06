//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api/kinds              - Supported resource kinds and capabilities
//!
//! # Sync
//! GET  /api/sync/{kind}        - Preview the diff (?direction=)
//! POST /api/sync/{kind}        - {action: "sync" | "preview", direction?}
//!
//! # Theme settings
//! GET  /api/themes             - List themes (?role=stage|prod)
//! GET  /api/themes/backups     - List stored backups
//! POST /api/themes/backup      - Back up source theme settings {direction?}
//! POST /api/themes/push        - Push a backup to the target {backup_id, direction?}
//! ```

pub mod sync;
pub mod themes;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(sync::router()).merge(themes::router())
}
