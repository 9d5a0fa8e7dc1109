//! Mutation coordinator tests: optimistic apply, exact rollback, settle
//! ordering, and invalidation scopes.

mod common;

use common::{test_cache, TestKey, TestScope};
use lattice_cache::{MutationCoordinator, MutationPlan, SettleWrite};
use lattice_commons::{StoreError, StoreResult};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn update_plan(id: u32, predicted: &str) -> MutationPlan<TestKey, String> {
    let predicted = predicted.to_string();
    MutationPlan {
        edits: vec![(
            TestKey::Detail(id),
            Box::new(move |_prev: Option<&String>| Some(predicted)),
        )],
        claims: vec![TestKey::Detail(id)],
        success_scopes: vec![TestScope::Lists],
        settle_scopes: vec![TestScope::Detail(id)],
    }
}

#[tokio::test]
async fn test_rollback_restores_exact_previous_value() {
    let cache = test_cache(600_000, 1_200_000);
    let coordinator = MutationCoordinator::new(cache.clone());
    cache.set_data(TestKey::Detail(1), "v".to_string());

    let result: StoreResult<String> = coordinator
        .run(
            update_plan(1, "v-prime"),
            || async { Err(StoreError::backend("write refused")) },
            |_server: &String| SettleWrite::None,
        )
        .await;

    assert!(matches!(result, Err(StoreError::Backend(_))));
    // Not v-prime, not gone: exactly v
    assert_eq!(cache.peek(&TestKey::Detail(1)).as_deref(), Some("v"));
}

#[tokio::test]
async fn test_rollback_removes_entry_that_did_not_exist() {
    let cache = test_cache(600_000, 1_200_000);
    let coordinator = MutationCoordinator::new(cache.clone());

    let result: StoreResult<String> = coordinator
        .run(
            update_plan(9, "phantom"),
            || async { Err(StoreError::backend("nope")) },
            |_| SettleWrite::None,
        )
        .await;

    assert!(result.is_err());
    assert!(
        cache.peek(&TestKey::Detail(9)).is_none(),
        "snapshot was empty, so rollback empties the entry again"
    );
}

#[tokio::test(start_paused = true)]
async fn test_optimistic_value_is_visible_during_flight() {
    let cache = test_cache(600_000, 1_200_000);
    let coordinator = MutationCoordinator::new(cache.clone());
    cache.set_data(TestKey::Detail(1), "v".to_string());

    let task = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            coordinator
                .run(
                    update_plan(1, "v-prime"),
                    || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Err::<String, _>(StoreError::transport("timeout"))
                    },
                    |_| SettleWrite::None,
                )
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    // Zero-latency observation of the predicted value while the write runs
    assert_eq!(cache.peek(&TestKey::Detail(1)).as_deref(), Some("v-prime"));

    let result = task.await.unwrap();
    assert!(result.is_err());
    assert_eq!(cache.peek(&TestKey::Detail(1)).as_deref(), Some("v"));
}

#[tokio::test]
async fn test_success_overwrites_with_authoritative_value() {
    let cache = test_cache(600_000, 1_200_000);
    let coordinator = MutationCoordinator::new(cache.clone());
    cache.set_data(TestKey::Detail(1), "v".to_string());
    cache.set_data(TestKey::List(1), "list-v".to_string());

    let result = coordinator
        .run(
            update_plan(1, "predicted"),
            || async { Ok("authoritative".to_string()) },
            |server: &String| SettleWrite::Set(TestKey::Detail(1), server.clone()),
        )
        .await
        .unwrap();

    assert_eq!(result, "authoritative");
    // The server value replaced the prediction; the detail scope
    // invalidation marks it for eventual refetch but the data stands.
    assert_eq!(
        cache.peek(&TestKey::Detail(1)).as_deref(),
        Some("authoritative")
    );
}

#[tokio::test]
async fn test_success_invalidates_list_scope() {
    let cache = test_cache(600_000, 1_200_000);
    let coordinator = MutationCoordinator::new(cache.clone());

    // Seed a fresh list entry, then count refetches after the mutation
    let calls = Arc::new(AtomicU32::new(0));
    let calls_in = calls.clone();
    let fetcher = move || {
        calls_in.fetch_add(1, Ordering::SeqCst);
        async { Ok("list-data".to_string()) }
    };
    cache.read(TestKey::List(1), &fetcher).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    coordinator
        .run(
            update_plan(1, "v-prime"),
            || async { Ok("server".to_string()) },
            |server: &String| SettleWrite::Set(TestKey::Detail(1), server.clone()),
        )
        .await
        .unwrap();

    // Membership may have changed: the list variant must refetch
    cache.read(TestKey::List(1), &fetcher).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_does_not_invalidate_lists() {
    let cache = test_cache(600_000, 1_200_000);
    let coordinator = MutationCoordinator::new(cache.clone());

    let calls = Arc::new(AtomicU32::new(0));
    let calls_in = calls.clone();
    let fetcher = move || {
        calls_in.fetch_add(1, Ordering::SeqCst);
        async { Ok("list-data".to_string()) }
    };
    cache.read(TestKey::List(1), &fetcher).await.unwrap();

    let _ = coordinator
        .run(
            update_plan(1, "v-prime"),
            || async { Err::<String, _>(StoreError::backend("down")) },
            |_| SettleWrite::None,
        )
        .await;

    cache.read(TestKey::List(1), &fetcher).await.unwrap();
    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "failed mutation leaves list entries fresh"
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_settle_cannot_overwrite_newer_mutation() {
    let cache = test_cache(600_000, 1_200_000);
    let coordinator = MutationCoordinator::new(cache.clone());
    cache.set_data(TestKey::Detail(1), "v0".to_string());

    // Mutation A: slow, will fail, would roll back to "v0"
    let slow = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            coordinator
                .run(
                    update_plan(1, "a-prediction"),
                    || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Err::<String, _>(StoreError::backend("a failed"))
                    },
                    |_| SettleWrite::None,
                )
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Mutation B: issued later on the same key, succeeds immediately
    coordinator
        .run(
            update_plan(1, "b-prediction"),
            || async { Ok("b-server".to_string()) },
            |server: &String| SettleWrite::Set(TestKey::Detail(1), server.clone()),
        )
        .await
        .unwrap();

    let a_result = slow.await.unwrap();
    assert!(a_result.is_err());

    // A's rollback was superseded by B's settle; B's value stands
    assert_eq!(cache.peek(&TestKey::Detail(1)).as_deref(), Some("b-server"));
}

#[tokio::test]
async fn test_plain_plan_touches_nothing_on_failure() {
    let cache = test_cache(600_000, 1_200_000);
    let coordinator = MutationCoordinator::new(cache.clone());
    cache.set_data(TestKey::Detail(1), "v".to_string());

    let result: StoreResult<String> = coordinator
        .run(
            MutationPlan::plain(vec![TestKey::Detail(42)]),
            || async { Err(StoreError::not_found("customers", "42")) },
            |_| SettleWrite::None,
        )
        .await;

    assert!(matches!(result, Err(StoreError::NotFound { .. })));
    assert_eq!(cache.peek(&TestKey::Detail(1)).as_deref(), Some("v"));
    assert!(cache.peek(&TestKey::Detail(42)).is_none());
}
