use std::sync::Arc;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use roost::{
    Method, RawResponse, Request, Response, Url,
    cache::{CacheManager, SharedCacheManager},
};
use roost_moka::{EvictionPolicy, MokaStore, MokaStoreBuilder};
use roost_store::{DeleteStatus, Store};
use roost_test::FixedClock;

fn value(size: usize) -> Bytes {
    Bytes::from(vec![7u8; size])
}

#[tokio::test]
async fn set_get_delete() {
    let store = MokaStore::builder().max_entries(100).build();

    assert_eq!(store.get("missing").await.unwrap(), None);
    store.set("key", value(3)).await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), Some(value(3)));

    assert!(matches!(
        store.delete("key").await.unwrap(),
        DeleteStatus::Deleted(1)
    ));
    assert!(matches!(
        store.delete("key").await.unwrap(),
        DeleteStatus::Missing
    ));
    assert_eq!(store.name(), "moka");
}

#[tokio::test]
async fn byte_capacity_evicts_least_recently_used() {
    let store = MokaStoreBuilder::default()
        .name("bounded")
        .max_bytes(3 * (5 + 100 + 64))
        .build();

    for id in 1..=3 {
        store.set(&format!("key-{id}"), value(100)).await.unwrap();
    }
    store.run_pending_tasks().await;
    for id in 1..=3 {
        assert!(store.get(&format!("key-{id}")).await.unwrap().is_some());
    }

    store.set("key-4", value(100)).await.unwrap();
    store.run_pending_tasks().await;

    assert!(store.get("key-4").await.unwrap().is_some());
    let mut remaining = 0;
    for id in 1..=4 {
        if store.get(&format!("key-{id}")).await.unwrap().is_some() {
            remaining += 1;
        }
    }
    assert_eq!(remaining, 3);
}

#[tokio::test]
async fn entry_capacity_with_lru_policy() {
    let store = MokaStore::builder()
        .max_entries(2)
        .eviction_policy(EvictionPolicy::lru())
        .build();

    for id in 1..=3 {
        store.set(&format!("key-{id}"), value(1)).await.unwrap();
        store.run_pending_tasks().await;
    }

    assert_eq!(store.entry_count(), 2);
    assert!(store.get("key-1").await.unwrap().is_none());
}

#[tokio::test]
async fn backs_a_shared_cache_manager() {
    let clock = FixedClock::default();
    let store = MokaStore::builder().max_entries(100).build();
    let manager = SharedCacheManager::new(store.clone()).with_clock(Arc::new(clock.clone()));
    let request = Request::new(Method::GET, Url::parse("http://example.com/a").unwrap());
    let raw = RawResponse::new(200, "cached").with_header("Cache-Control", "max-age=60");
    let response = Response::from_raw(raw, request.clone(), request.uri().clone()).unwrap();

    assert!(manager.store(&request, &response).await);
    store.run_pending_tasks().await;
    assert_eq!(store.entry_count(), 1);

    let hit = manager.lookup(&request).await.unwrap();
    assert_eq!(hit.body().as_ref(), b"cached");

    manager.invalidate(request.uri()).await;
    assert!(manager.lookup_entry(&request).await.is_none());
}
