//! Cursor pagination for REST and GraphQL list endpoints.
//!
//! Both helpers are built on [`paginate`] and return lazy streams: nothing is
//! fetched until the stream is polled, and each call starts again from the
//! first page. A listing that runs past [`MAX_PAGES`] fails instead of
//! looping forever.

use std::sync::Arc;

use async_stream::try_stream;
use futures::Stream;
use graphql_client::GraphQLQuery;
use serde::de::DeserializeOwned;
use shop_sync_core::StoreCredential;
use url::Url;

use super::{ShopifyClient, ShopifyError, queries::Connection};

/// Maximum number of pages to follow for a single listing.
pub const MAX_PAGES: usize = 200;

/// Page size for REST list endpoints (Shopify's maximum).
pub const REST_PAGE_LIMIT: u32 = 250;

/// Extract the `page_info` cursor of the `rel="next"` entry of a `Link` header.
///
/// Shopify sends `<https://shop/admin/api/.../products.json?limit=250&page_info=abc>; rel="next"`,
/// optionally alongside a `rel="previous"` entry.
#[must_use]
pub fn next_page_info(link_header: &str) -> Option<String> {
    link_header
        .split(',')
        .filter(|part| {
            part.split(';')
                .skip(1)
                .any(|param| param.trim().replace('"', "") == "rel=next")
        })
        .find_map(|part| {
            let start = part.find('<')?;
            let end = part.find('>')?;
            let raw = part.get(start + 1..end)?;
            let url = Url::parse(raw).ok()?;
            url.query_pairs()
                .find(|(key, _)| key == "page_info")
                .map(|(_, value)| value.into_owned())
        })
}

/// One fetched page: its items and the cursor of the page after it.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> From<Connection<T>> for Page<T> {
    fn from(connection: Connection<T>) -> Self {
        let next = connection
            .page_info
            .has_next_page
            .then_some(connection.page_info.end_cursor)
            .flatten();
        Self {
            items: connection.nodes,
            next,
        }
    }
}

/// Follow `fetch` from the first page until a page has no next cursor.
///
/// `fetch` receives `None` for the first page, then each page's cursor in
/// turn. Errors end the stream; so does the [`MAX_PAGES`] cap.
pub fn paginate<T, F, Fut>(mut fetch: F) -> impl Stream<Item = Result<T, ShopifyError>> + Send
where
    T: Send,
    F: FnMut(Option<String>) -> Fut + Send,
    Fut: Future<Output = Result<Page<T>, ShopifyError>> + Send,
{
    try_stream! {
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            pages += 1;
            if pages > MAX_PAGES {
                Err(ShopifyError::TooManyPages(MAX_PAGES))?;
            }

            let page = fetch(cursor.take()).await?;
            for item in page.items {
                yield item;
            }

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
    }
}

/// Stream every element of `key` across all pages of a REST list endpoint.
///
/// `fields` is forwarded on every page; Shopify rejects other filters once a
/// `page_info` cursor is present, so none are accepted here.
pub fn rest_items<'a>(
    client: &'a ShopifyClient,
    store: &'a StoreCredential,
    path: &'a str,
    key: &'a str,
    fields: Option<&'a str>,
) -> impl Stream<Item = Result<serde_json::Value, ShopifyError>> + Send + 'a {
    paginate(move |cursor| async move {
        let mut query = vec![("limit", REST_PAGE_LIMIT.to_string())];
        if let Some(fields) = fields {
            query.push(("fields", fields.to_string()));
        }
        if let Some(cursor) = cursor {
            query.push(("page_info", cursor));
        }

        let page = client.rest_get(store, path, &query).await?;
        Ok::<_, ShopifyError>(Page {
            items: take_array(page.body, key)?,
            next: page.next_page_info,
        })
    })
}

/// Stream every node of a GraphQL connection across all pages.
///
/// `variables` builds the query variables for a given `after` cursor and
/// `extract` pulls the connection out of the response.
pub fn graphql_nodes<'a, Q, T, V, X>(
    client: &'a ShopifyClient,
    store: &'a StoreCredential,
    variables: V,
    extract: X,
) -> impl Stream<Item = Result<T, ShopifyError>> + Send + 'a
where
    Q: GraphQLQuery + 'a,
    Q::Variables: Send,
    Q::ResponseData: DeserializeOwned + Send,
    T: Send + 'a,
    V: Fn(Option<String>) -> Q::Variables + Send + 'a,
    X: Fn(Q::ResponseData) -> Connection<T> + Send + Sync + 'a,
{
    let extract = Arc::new(extract);
    paginate(move |cursor| {
        let vars = variables(cursor);
        let extract = Arc::clone(&extract);
        async move {
            let data = client.execute::<Q>(store, vars).await?;
            Ok::<_, ShopifyError>(Page::from(extract(data)))
        }
    })
}

/// Take the array stored under `key` out of a REST response body.
///
/// # Errors
///
/// Returns [`ShopifyError::UnexpectedShape`] when `key` is absent or not an array.
pub fn take_array(
    mut body: serde_json::Value,
    key: &str,
) -> Result<Vec<serde_json::Value>, ShopifyError> {
    match body.get_mut(key).map(serde_json::Value::take) {
        Some(serde_json::Value::Array(items)) => Ok(items),
        _ => Err(ShopifyError::UnexpectedShape(format!(
            "expected an array under \"{key}\""
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::{TryStreamExt, future};
    use serde_json::json;

    use crate::shopify::queries::PageInfo;

    fn page(items: Vec<u32>, next: Option<&str>) -> Page<u32> {
        Page {
            items,
            next: next.map(str::to_string),
        }
    }

    #[test]
    fn test_next_page_info_only_next() {
        let header = r#"<https://a.myshopify.com/admin/api/2025-10/products.json?limit=250&page_info=eyJsYXN0X2lkIjo0fQ>; rel="next""#;
        assert_eq!(
            next_page_info(header).as_deref(),
            Some("eyJsYXN0X2lkIjo0fQ")
        );
    }

    #[test]
    fn test_next_page_info_with_previous() {
        let header = concat!(
            r#"<https://a.myshopify.com/admin/api/2025-10/products.json?limit=250&page_info=prev123>; rel="previous", "#,
            r#"<https://a.myshopify.com/admin/api/2025-10/products.json?limit=250&page_info=next456>; rel="next""#
        );
        assert_eq!(next_page_info(header).as_deref(), Some("next456"));
    }

    #[test]
    fn test_next_page_info_last_page() {
        let header = r#"<https://a.myshopify.com/admin/api/2025-10/products.json?limit=250&page_info=prev123>; rel="previous""#;
        assert_eq!(next_page_info(header), None);
        assert_eq!(next_page_info(""), None);
    }

    #[test]
    fn test_take_array() {
        let items = take_array(json!({"products": [{"id": 1}, {"id": 2}]}), "products").unwrap();
        assert_eq!(items.len(), 2);

        let err = take_array(json!({"errors": "Not Found"}), "products").unwrap_err();
        assert!(matches!(err, ShopifyError::UnexpectedShape(_)));
    }

    #[tokio::test]
    async fn test_paginate_follows_cursor_across_pages() {
        let mut cursors = Vec::new();
        let items: Vec<u32> = paginate(|cursor: Option<String>| {
            let next = match cursor.as_deref() {
                None => page(vec![1, 2], Some("b")),
                Some("b") => page(vec![3], Some("c")),
                Some(_) => page(vec![4, 5], None),
            };
            cursors.push(cursor);
            future::ready(Ok(next))
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            cursors,
            vec![None, Some("b".to_string()), Some("c".to_string())]
        );
    }

    #[tokio::test]
    async fn test_paginate_single_empty_page() {
        let mut fetched = 0;
        let items: Vec<u32> = paginate(|_| {
            fetched += 1;
            future::ready(Ok(page(vec![], None)))
        })
        .try_collect()
        .await
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(fetched, 1);
    }

    #[tokio::test]
    async fn test_paginate_stops_at_page_cap() {
        let mut fetched = 0usize;
        let result: Result<Vec<u32>, _> = paginate(|_| {
            fetched += 1;
            future::ready(Ok(page(vec![1], Some("again"))))
        })
        .try_collect()
        .await;

        assert!(matches!(result, Err(ShopifyError::TooManyPages(MAX_PAGES))));
        assert_eq!(fetched, MAX_PAGES);
    }

    #[tokio::test]
    async fn test_paginate_error_ends_listing() {
        let mut fetched = 0;
        let result: Result<Vec<u32>, _> = paginate(|cursor: Option<String>| {
            fetched += 1;
            future::ready(match cursor {
                None => Ok(page(vec![1], Some("b"))),
                Some(_) => Err(ShopifyError::RateLimited(2)),
            })
        })
        .try_collect()
        .await;

        assert!(matches!(result, Err(ShopifyError::RateLimited(2))));
        assert_eq!(fetched, 2);
    }

    #[test]
    fn test_connection_page_cursor() {
        let connection = |has_next_page, end_cursor: Option<&str>| Connection {
            nodes: vec![1_u32],
            page_info: PageInfo {
                has_next_page,
                end_cursor: end_cursor.map(str::to_string),
            },
        };

        assert_eq!(Page::from(connection(true, Some("x"))).next.as_deref(), Some("x"));
        assert_eq!(Page::from(connection(false, Some("x"))).next, None);
        assert_eq!(Page::from(connection(true, None)).next, None);
    }
}
