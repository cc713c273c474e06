//! HTTP surface, driven through the router without a listener.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use shop_sync_dashboard::backup::{BackupStore, ThemeBackups};
use shop_sync_dashboard::config::ShopifyApiConfig;
use shop_sync_dashboard::shopify::ShopifyClient;
use shop_sync_dashboard::sync::{RoleCredentials, StoreRoles};
use shop_sync_dashboard::{AppState, routes};
use shop_sync_integration_tests::{
    Calls, MemoryAdapter, PROD, STAGE, fast_policy, item, orchestrator, store_roles,
};
use tower::ServiceExt;

fn app(adapter: &Arc<MemoryAdapter>, stores: StoreRoles, backups: &tempfile::TempDir) -> Router {
    let client = ShopifyClient::new(&ShopifyApiConfig::default()).unwrap();
    let state = AppState::from_parts(
        orchestrator(adapter, stores.clone(), fast_policy(2, Duration::from_secs(5))),
        ThemeBackups::new(client, stores, BackupStore::new(backups.path())),
    );
    routes::routes().with_state(state)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    read(app, request).await
}

async fn send_raw(app: Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    read(app, request).await
}

async fn read(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_sync_action_returns_report() {
    let adapter = MemoryAdapter::read_write();
    adapter.seed_items(STAGE, [item("a", "A", "1")]);
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(
        app(&adapter, store_roles(), &dir),
        "POST",
        "/api/sync/collections",
        Some(json!({ "action": "sync", "direction": "stage-to-prod" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["kind"], "collections");
    assert_eq!(body["total_synced"], 1);
    assert_eq!(body["outcomes"][0]["status"], "created");
    assert_eq!(adapter.items(PROD).len(), 1);
}

#[tokio::test]
async fn test_direction_defaults_to_stage_to_prod() {
    let adapter = MemoryAdapter::read_write();
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(
        app(&adapter, store_roles(), &dir),
        "POST",
        "/api/sync/collections",
        Some(json!({ "action": "preview" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["direction"], "stage-to-prod");
    assert_eq!(body["source"], STAGE);
}

#[tokio::test]
async fn test_get_preview_does_not_write() {
    let adapter = MemoryAdapter::read_write();
    adapter.seed_items(PROD, [item("a", "A", "1")]);
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(
        app(&adapter, store_roles(), &dir),
        "GET",
        "/api/sync/collections?direction=prod-to-stage",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["missing_in_target"], json!(["A"]));
    assert_eq!(body["capabilities"]["create"], true);
    assert_eq!(Calls::get(&adapter.calls.creates), 0);
}

#[tokio::test]
async fn test_unknown_kind_is_report_shaped_bad_request() {
    let adapter = MemoryAdapter::read_write();
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(
        app(&adapter, store_roles(), &dir),
        "POST",
        "/api/sync/widgets",
        Some(json!({ "action": "sync" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unknown resource kind: widgets");
    assert_eq!(body["outcomes"], json!([]));
}

#[tokio::test]
async fn test_unknown_action_and_direction_are_rejected() {
    let adapter = MemoryAdapter::read_write();
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(
        app(&adapter, store_roles(), &dir),
        "POST",
        "/api/sync/collections",
        Some(json!({ "action": "delete" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("unknown action"));

    let (status, body) = send(
        app(&adapter, store_roles(), &dir),
        "GET",
        "/api/sync/collections?direction=sideways",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(Calls::get(&adapter.calls.lists), 0);
}

#[tokio::test]
async fn test_malformed_bodies_are_report_shaped_bad_requests() {
    let adapter = MemoryAdapter::read_write();
    let dir = tempfile::tempdir().unwrap();

    for (uri, body) in [
        ("/api/sync/collections", "{}"),
        ("/api/sync/collections", "not json"),
        ("/api/sync/collections", r#"{"action": 7}"#),
        ("/api/themes/backup", "[1, 2"),
        ("/api/themes/push", r#"{"backup_id": "nope"}"#),
    ] {
        let (status, report) = send_raw(app(&adapter, store_roles(), &dir), uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
        assert_eq!(report["success"], false, "{uri} {body}");
        assert_eq!(report["outcomes"], json!([]));
        assert!(!report["message"].as_str().unwrap().is_empty());
    }
    assert_eq!(Calls::get(&adapter.calls.lists), 0);
}

#[tokio::test]
async fn test_missing_credentials_are_reported() {
    let adapter = MemoryAdapter::read_write();
    let dir = tempfile::tempdir().unwrap();
    let stores = StoreRoles {
        stage: RoleCredentials::default(),
        prod: store_roles().prod,
    };

    let (status, body) = send(
        app(&adapter, stores, &dir),
        "POST",
        "/api/sync/collections",
        Some(json!({ "action": "sync" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("STAGE_SHOP"));
    assert_eq!(Calls::get(&adapter.calls.lists), 0);
}

#[tokio::test]
async fn test_list_kinds() {
    let adapter = MemoryAdapter::read_write();
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(app(&adapter, store_roles(), &dir), "GET", "/api/kinds", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "kind": "collections", "create": true, "update": true }])
    );
}

#[tokio::test]
async fn test_backups_empty_and_unknown_push_is_not_found() {
    let adapter = MemoryAdapter::read_write();
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(
        app(&adapter, store_roles(), &dir),
        "GET",
        "/api/themes/backups",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(
        app(&adapter, store_roles(), &dir),
        "POST",
        "/api/themes/push",
        Some(json!({ "backup_id": "00000000-0000-0000-0000-000000000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_bad_theme_role_is_rejected() {
    let adapter = MemoryAdapter::read_write();
    let dir = tempfile::tempdir().unwrap();

    let (status, _) = send(
        app(&adapter, store_roles(), &dir),
        "GET",
        "/api/themes?role=qa",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
