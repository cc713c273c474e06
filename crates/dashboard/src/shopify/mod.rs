//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! Both store tokens are Admin API tokens with write access to products,
//! collections, navigation, discounts and themes. The dashboard should only
//! run on trusted infrastructure.
//!
//! # Architecture
//!
//! - One [`ShopifyClient`] is shared by every adapter and both stores; each
//!   call takes the [`StoreCredential`](shop_sync_core::StoreCredential) it
//!   targets.
//! - REST list endpoints are walked page by page via the `Link` header
//!   (see [`pagination`]).
//! - GraphQL operations implement `graphql_client::GraphQLQuery` by hand in
//!   [`queries`].

mod client;
pub mod pagination;
pub mod queries;
pub mod themes;

pub use client::{RestPage, ShopifyClient};
pub use themes::{Theme, ThemeRole};

use thiserror::Error;

/// Errors that can occur when talking to the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; carries the raw body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response was valid JSON but not the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedShape(String),

    /// Resource not found; `body` is the raw response body, if any.
    #[error("Not found: {what}{}", body_suffix(.body))]
    NotFound { what: String, body: String },

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Invalid or revoked access token; carries the raw body.
    #[error("Unauthorized (invalid or revoked access token): {0}")]
    Unauthorized(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// Listing kept returning pages past the safety cap.
    #[error("Pagination exceeded {0} pages")]
    TooManyPages(usize),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

fn body_suffix(body: &str) -> String {
    if body.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", body.trim())
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

/// `userErrors` entry returned by Admin API mutations.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Fail with [`ShopifyError::UserError`] when a mutation reported user errors.
///
/// # Errors
///
/// Returns the joined `field: message` list when `errors` is non-empty.
pub fn check_user_errors(errors: &[UserError]) -> Result<(), ShopifyError> {
    if errors.is_empty() {
        return Ok(());
    }
    let msg = errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    Err(ShopifyError::UserError(msg))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::Status {
            status: 422,
            body: r#"{"errors":{"handle":["has already been taken"]}}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"HTTP 422: {"errors":{"handle":["has already been taken"]}}"#
        );
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field not found".to_string(),
                path: vec![],
            },
            GraphQLError {
                message: "Invalid ID".to_string(),
                path: vec![],
            },
        ];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(err.to_string(), "GraphQL errors: Field not found; Invalid ID");
    }

    #[test]
    fn test_check_user_errors() {
        assert!(check_user_errors(&[]).is_ok());

        let errors = vec![
            UserError {
                field: Some(vec!["menu".to_string(), "handle".to_string()]),
                message: "has already been taken".to_string(),
            },
            UserError {
                field: None,
                message: "Too many items".to_string(),
            },
        ];
        let err = check_user_errors(&errors).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User error: menu.handle: has already been taken, Too many items"
        );
    }
}
