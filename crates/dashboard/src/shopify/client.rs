//! HTTP plumbing shared by every adapter.

use std::sync::Arc;

use graphql_client::GraphQLQuery;
use reqwest::{Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, de::DeserializeOwned};
use shop_sync_core::StoreCredential;
use tracing::instrument;

use crate::config::ShopifyApiConfig;

use super::{GraphQLError, ShopifyError, pagination::next_page_info};

/// Shopify Admin API client.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    api_version: String,
}

impl std::fmt::Debug for ShopifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyClient")
            .field("api_version", &self.inner.api_version)
            .finish_non_exhaustive()
    }
}

/// One page of a REST list endpoint.
#[derive(Debug)]
pub struct RestPage {
    /// Decoded JSON body.
    pub body: serde_json::Value,
    /// Cursor for the next page, from the `Link` header.
    pub next_page_info: Option<String>,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

impl ShopifyClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ShopifyApiConfig) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                api_version: config.api_version.clone(),
            }),
        })
    }

    fn url(&self, store: &StoreCredential, path: &str) -> String {
        format!(
            "https://{}/admin/api/{}/{}",
            store.domain(),
            self.inner.api_version,
            path.trim_start_matches('/')
        )
    }

    // =========================================================================
    // REST
    // =========================================================================

    /// GET one page of a REST endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or invalid JSON.
    #[instrument(skip(self, store, query), fields(store = %store.domain()))]
    pub async fn rest_get(
        &self,
        store: &StoreCredential,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<RestPage, ShopifyError> {
        let response = self
            .inner
            .client
            .get(self.url(store, path))
            .header("X-Shopify-Access-Token", store.access_token().expose_secret())
            .query(query)
            .send()
            .await?;

        let response = check_status(response).await?;
        let next_page_info = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_info);
        let text = response.text().await?;
        let body = serde_json::from_str(&text)?;

        Ok(RestPage {
            body,
            next_page_info,
        })
    }

    /// Send a JSON body with POST or PUT.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or invalid JSON.
    #[instrument(skip(self, store, body), fields(store = %store.domain()))]
    pub async fn rest_send(
        &self,
        store: &StoreCredential,
        method: Method,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ShopifyError> {
        let response = self
            .inner
            .client
            .request(method, self.url(store, path))
            .header("X-Shopify-Access-Token", store.access_token().expose_secret())
            .json(body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    // =========================================================================
    // GraphQL
    // =========================================================================

    /// Execute a GraphQL query or mutation against one store.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, GraphQL errors
    /// or a response without data.
    #[instrument(skip(self, store, variables), fields(store = %store.domain()))]
    pub async fn execute<Q: GraphQLQuery>(
        &self,
        store: &StoreCredential,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(self.url(store, "graphql.json"))
            .header("X-Shopify-Access-Token", store.access_token().expose_secret())
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let graphql_response: GraphQLResponse<Q::ResponseData> = response.json().await?;

        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    path: e.path,
                })
                .collect();
            return Err(ShopifyError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                path: vec![],
            }])
        })
    }
}

/// Map rate limiting, auth failures and other non-2xx responses to errors.
async fn check_status(response: Response) -> Result<Response, ShopifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, retry_after.as_deref(), path, body))
}

/// Error for a non-2xx response. Every variant but rate limiting keeps the body.
fn status_error(
    status: StatusCode,
    retry_after: Option<&str>,
    path: String,
    body: String,
) -> ShopifyError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let secs = retry_after
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map_or(2, |secs| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let secs = secs.ceil().max(0.0) as u64;
                    secs
                });
            ShopifyError::RateLimited(secs)
        }
        StatusCode::UNAUTHORIZED => ShopifyError::Unauthorized(body),
        StatusCode::NOT_FOUND => ShopifyError::NotFound { what: path, body },
        _ => ShopifyError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "/admin/api/2025-10/products/9.json";

    #[test]
    fn test_status_error_keeps_body_on_auth_and_missing() {
        let err = status_error(
            StatusCode::UNAUTHORIZED,
            None,
            PATH.to_string(),
            r#"{"errors":"[API] Invalid API key or access token"}"#.to_string(),
        );
        assert!(matches!(err, ShopifyError::Unauthorized(ref body) if body.contains("Invalid API key")));
        assert!(err.to_string().contains("Invalid API key"));

        let err = status_error(
            StatusCode::NOT_FOUND,
            None,
            PATH.to_string(),
            r#"{"errors":"Not Found"}"#.to_string(),
        );
        assert!(matches!(
            err,
            ShopifyError::NotFound { ref what, ref body } if what == PATH && body.contains("Not Found")
        ));
        assert!(err.to_string().contains(r#"{"errors":"Not Found"}"#));
    }

    #[test]
    fn test_status_error_other_statuses() {
        let err = status_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            None,
            PATH.to_string(),
            "bad".to_string(),
        );
        assert!(matches!(err, ShopifyError::Status { status: 422, ref body } if body == "bad"));

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, Some("1.5"), PATH.to_string(), String::new());
        assert!(matches!(err, ShopifyError::RateLimited(2)));

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, Some("soon"), PATH.to_string(), String::new());
        assert!(matches!(err, ShopifyError::RateLimited(2)));

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, Some("4"), PATH.to_string(), String::new());
        assert!(matches!(err, ShopifyError::RateLimited(4)));
    }
}
