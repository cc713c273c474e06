//! Unified error handling for the dashboard.
//!
//! Every fatal error reaches the caller as a `SyncReport`-shaped JSON body
//! with `success: false`, never as a bare status line.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shop_sync_core::{ResourceKind, SyncDirection, SyncReport, UnknownResourceError};
use thiserror::Error;

use crate::backup::BackupError;
use crate::config::ConfigError;
use crate::shopify::ShopifyError;
use crate::sync::FetchError;

/// Fatal errors for one dashboard operation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Credentials missing or invalid; raised before any network call.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Listing the source or target failed.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Caller named a resource kind with no adapter.
    #[error("{0}")]
    UnknownResource(#[from] UnknownResourceError),

    /// Theme settings backup could not be written or read.
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    /// Shopify call outside a sync failed (theme listing, asset push).
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl SyncError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnknownResource(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Backup(BackupError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Config(_) | Self::Backup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Fetch(_) | Self::Shopify(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Top-level failure report for this error.
    #[must_use]
    pub fn into_report(self, kind: Option<ResourceKind>, direction: SyncDirection) -> SyncReport {
        SyncReport::failure(kind, direction, self.to_string())
    }

    fn capture(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Sync request error"
            );
        }
    }
}

/// A [`SyncError`] with the request context needed to render its report.
#[derive(Debug)]
pub struct SyncFailure {
    pub kind: Option<ResourceKind>,
    pub direction: SyncDirection,
    pub error: SyncError,
}

impl SyncFailure {
    pub fn new(kind: Option<ResourceKind>, direction: SyncDirection, error: impl Into<SyncError>) -> Self {
        Self {
            kind,
            direction,
            error: error.into(),
        }
    }
}

impl IntoResponse for SyncFailure {
    fn into_response(self) -> Response {
        self.error.capture();
        let status = self.error.status();
        let report = self.error.into_report(self.kind, self.direction);
        (status, Json(report)).into_response()
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        SyncFailure::new(None, SyncDirection::default(), self).into_response()
    }
}
