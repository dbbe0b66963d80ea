// Integration tests for the Redis reservation store.
//
// These tests require a running Redis instance:
//   docker run -d -p 6379:6379 redis:7-alpine
// The reset tests clear shared reservation keys, so run single-threaded:
//   cargo test -p flashsale-api -- --ignored --test-threads=1

use std::time::Duration;

use flashsale_api::config::SaleLimits;
use flashsale_api::kv::{ReservationError, ReservationStore};

const REDIS_URL: &str = "redis://127.0.0.1:6379/";

fn default_limits() -> SaleLimits {
    SaleLimits {
        inventory_cap: 10_000,
        concurrent_cap: 10,
        total_cap: 10,
    }
}

async fn store_with(ttl: Duration, limits: SaleLimits) -> ReservationStore {
    ReservationStore::connect(REDIS_URL, ttl, limits)
        .await
        .expect("Redis must be running for integration tests")
}

/// Unique suffix so concurrent test runs do not trample each other's keys.
fn unique(prefix: &str) -> String {
    format!("{}-{:x}", prefix, rand::random::<u64>())
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn reservation_round_trip() {
    let store = store_with(Duration::from_secs(60), default_limits()).await;
    let user = unique("user");
    let item = unique("item");
    let code = unique("code");

    store
        .create_reservation(&user, &item, &code)
        .await
        .unwrap();

    let (got_user, got_item) = store.get_reservation(&code).await.unwrap();
    assert_eq!(got_user, user);
    assert_eq!(got_item, item);

    store
        .delete_reservation(&user, &item, &code)
        .await
        .unwrap();

    assert!(matches!(
        store.get_reservation(&code).await,
        Err(ReservationError::NotFound)
    ));
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn item_cannot_be_reserved_twice() {
    let store = store_with(Duration::from_secs(60), default_limits()).await;
    let item = unique("item");

    store
        .create_reservation(&unique("user"), &item, &unique("code"))
        .await
        .unwrap();

    let second = store
        .create_reservation(&unique("user"), &item, &unique("code"))
        .await;
    assert!(matches!(second, Err(ReservationError::ItemReserved)));
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn sold_item_cannot_be_reserved() {
    let store = store_with(Duration::from_secs(60), default_limits()).await;
    let item = unique("item");

    store.mark_item_sold(&item).await.unwrap();

    let result = store
        .create_reservation(&unique("user"), &item, &unique("code"))
        .await;
    assert!(matches!(result, Err(ReservationError::ItemAlreadySold)));
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn concurrent_reservation_cap_is_enforced() {
    let limits = SaleLimits {
        inventory_cap: 10_000,
        concurrent_cap: 2,
        total_cap: 10,
    };
    let store = store_with(Duration::from_secs(60), limits).await;
    let user = unique("user");

    for _ in 0..2 {
        store
            .create_reservation(&user, &unique("item"), &unique("code"))
            .await
            .unwrap();
    }

    let third = store
        .create_reservation(&user, &unique("item"), &unique("code"))
        .await;
    assert!(matches!(
        third,
        Err(ReservationError::ConcurrentLimitExceeded)
    ));
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn total_purchase_cap_is_enforced() {
    let limits = SaleLimits {
        inventory_cap: 10_000,
        concurrent_cap: 10,
        total_cap: 1,
    };
    let store = store_with(Duration::from_secs(60), limits).await;
    let user = unique("user");

    let count = store.increment_user_purchases(&user).await.unwrap();
    assert_eq!(count, 1);

    let result = store
        .create_reservation(&user, &unique("item"), &unique("code"))
        .await;
    match result {
        Err(ReservationError::TotalLimitExceeded(cap)) => assert_eq!(cap, 1),
        other => panic!("expected TotalLimitExceeded, got {:?}", other),
    }
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn inventory_cap_is_enforced() {
    let limits = SaleLimits {
        inventory_cap: 1,
        concurrent_cap: 10,
        total_cap: 10,
    };
    let store = store_with(Duration::from_secs(60), limits).await;

    // The global set is shared state; start from a clean slate
    store.reset_transient().await.unwrap();

    store
        .create_reservation(&unique("user"), &unique("item"), &unique("code"))
        .await
        .unwrap();

    let second = store
        .create_reservation(&unique("user"), &unique("item"), &unique("code"))
        .await;
    assert!(matches!(second, Err(ReservationError::SoldOut)));

    store.reset_transient().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn reset_preserves_sold_markers_and_purchase_counts() {
    let store = store_with(Duration::from_secs(60), default_limits()).await;
    let user = unique("user");
    let sold_item = unique("item");
    let reserved_item = unique("item");
    let code = unique("code");

    store.mark_item_sold(&sold_item).await.unwrap();
    store.increment_user_purchases(&user).await.unwrap();
    store
        .create_reservation(&user, &reserved_item, &code)
        .await
        .unwrap();

    store.reset_transient().await.unwrap();

    // Transient state is gone
    assert!(matches!(
        store.get_reservation(&code).await,
        Err(ReservationError::NotFound)
    ));
    store
        .create_reservation(&user, &reserved_item, &unique("code"))
        .await
        .expect("item lock must be cleared by the reset");

    // Permanent state survives
    assert!(matches!(
        store
            .create_reservation(&user, &sold_item, &unique("code"))
            .await,
        Err(ReservationError::ItemAlreadySold)
    ));
    assert_eq!(store.increment_user_purchases(&user).await.unwrap(), 2);
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn expired_reservation_frees_the_item() {
    let store = store_with(Duration::from_secs(1), default_limits()).await;
    let item = unique("item");
    let code = unique("code");

    store
        .create_reservation(&unique("user"), &item, &code)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(matches!(
        store.get_reservation(&code).await,
        Err(ReservationError::NotFound)
    ));
    store
        .create_reservation(&unique("user"), &item, &unique("code"))
        .await
        .expect("expired lock must free the item");
}

#[tokio::test]
#[ignore] // Requires Redis running
async fn delete_tolerates_missing_keys() {
    let store = store_with(Duration::from_secs(60), default_limits()).await;

    // Deleting a reservation that never existed is not an error
    store
        .delete_reservation(&unique("user"), &unique("item"), &unique("code"))
        .await
        .unwrap();
}
