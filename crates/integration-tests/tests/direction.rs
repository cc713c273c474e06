//! Direction handling and credential validation.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use shop_sync_core::{OutcomeStatus, ResourceKind, StoreRole, SyncDirection};
use shop_sync_dashboard::SyncError;
use shop_sync_dashboard::config::ConfigError;
use shop_sync_dashboard::sync::{RoleCredentials, StoreRoles, resolve};
use shop_sync_integration_tests::{
    Calls, MemoryAdapter, PROD, STAGE, fast_policy, item, orchestrator, role, source_domain,
    store_roles,
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_resolve_swaps_roles() {
    let stores = store_roles();

    let forward = resolve(SyncDirection::StageToProd, &stores).unwrap();
    let backward = resolve(SyncDirection::ProdToStage, &stores).unwrap();

    assert_eq!(forward.source.domain(), STAGE);
    assert_eq!(forward.target.domain(), PROD);
    assert_eq!(forward.source, backward.target);
    assert_eq!(forward.target, backward.source);
}

#[tokio::test]
async fn test_prod_to_stage_writes_into_stage() {
    let adapter = MemoryAdapter::read_write();
    adapter.seed_items(PROD, [item("hotfix", "Hotfix", "1")]);

    let report = orchestrator(&adapter, store_roles(), fast_policy(2, TIMEOUT))
        .run(ResourceKind::Collections, SyncDirection::ProdToStage)
        .await
        .unwrap();

    assert_eq!(report.direction, SyncDirection::ProdToStage);
    assert_eq!(report.outcomes[0].status, OutcomeStatus::Created);
    assert_eq!(adapter.items(STAGE).len(), 1);
    assert_eq!(adapter.items(PROD).len(), 1);
}

#[tokio::test]
async fn test_both_directions_converge() {
    for direction in [SyncDirection::StageToProd, SyncDirection::ProdToStage] {
        let adapter = MemoryAdapter::read_write();
        let source = source_domain(direction);
        adapter.seed_items(source, [item("a", "A", "1"), item("b", "B", "2")]);

        orchestrator(&adapter, store_roles(), fast_policy(2, TIMEOUT))
            .run(ResourceKind::Collections, direction)
            .await
            .unwrap();

        let target = if source == STAGE { PROD } else { STAGE };
        let bodies = |domain| {
            adapter
                .items(domain)
                .into_iter()
                .map(|i| (i.identity_key, i.payload))
                .collect::<Vec<_>>()
        };
        assert_eq!(bodies(target), bodies(source));
    }
}

#[tokio::test]
async fn test_missing_target_token_fails_before_listing() {
    let adapter = MemoryAdapter::read_write();
    adapter.seed_items(STAGE, [item("a", "A", "1")]);
    let stores = StoreRoles {
        stage: role(STAGE, "shpat_stage_3f9a1c27be04d85e"),
        prod: RoleCredentials {
            domain: Some(PROD.to_string()),
            ..RoleCredentials::default()
        },
    };

    let err = orchestrator(&adapter, stores, fast_policy(2, TIMEOUT))
        .run(ResourceKind::Collections, SyncDirection::StageToProd)
        .await
        .unwrap_err();

    match err {
        SyncError::Config(ConfigError::MissingCredential { role, var, .. }) => {
            assert_eq!(role, StoreRole::Prod);
            assert_eq!(var, "PROD_ACCESS_TOKEN");
        }
        other => panic!("expected missing credential, got {other:?}"),
    }
    assert_eq!(Calls::get(&adapter.calls.lists), 0);
}

#[tokio::test]
async fn test_blank_source_domain_fails_in_either_direction() {
    let stores = StoreRoles {
        stage: role("   ", "shpat_stage_3f9a1c27be04d85e"),
        prod: role(PROD, "shpat_prod_6a1f0c9b72d4e318"),
    };

    for direction in [SyncDirection::StageToProd, SyncDirection::ProdToStage] {
        let adapter = MemoryAdapter::read_write();
        let report = orchestrator(&adapter, stores.clone(), fast_policy(2, TIMEOUT))
            .run_report(ResourceKind::Collections, direction)
            .await;

        assert!(!report.success);
        assert!(report.message.contains("STAGE_SHOP"));
        assert_eq!(Calls::get(&adapter.calls.lists), 0);
    }
}

#[tokio::test]
async fn test_unknown_kind_fails_after_credentials() {
    let adapter = MemoryAdapter::read_write();

    let err = orchestrator(&adapter, store_roles(), fast_policy(2, TIMEOUT))
        .run(ResourceKind::Discounts, SyncDirection::StageToProd)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::UnknownResource(_)));
    assert_eq!(Calls::get(&adapter.calls.lists), 0);
}
