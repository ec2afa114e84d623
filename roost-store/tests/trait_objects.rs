use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use roost_store::{DeleteStatus, Format, Store, StoreResult, store_key};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
struct MemStore {
    storage: DashMap<String, Bytes>,
}

#[async_trait]
impl Store for MemStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        Ok(self.storage.get(key).map(|value| value.clone()))
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.storage.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<DeleteStatus> {
        Ok(match self.storage.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn name(&self) -> &str {
        "mem"
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Payload {
    name: String,
    index: u8,
}

async fn roundtrip<S: Store>(store: S) {
    let key = store_key("http://example.com/resource");
    let value = Payload {
        name: "test".to_owned(),
        index: 42,
    };
    store
        .set(&key, Format::Bincode.encode(&value).unwrap())
        .await
        .unwrap();

    let raw = store.get(&key).await.unwrap().unwrap();
    assert_eq!(Format::decode::<Payload>(&raw).unwrap(), value);
    assert_eq!(store.name(), "mem");

    assert_eq!(store.delete(&key).await.unwrap(), DeleteStatus::Deleted(1));
    assert_eq!(store.delete(&key).await.unwrap(), DeleteStatus::Missing);
    assert!(store.get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn dyn_ref_store() {
    let store = MemStore::default();
    roundtrip(&store as &dyn Store).await;
}

#[tokio::test]
async fn boxed_store() {
    let store: Box<dyn Store> = Box::new(MemStore::default());
    roundtrip(store).await;
}

#[tokio::test]
async fn arc_store() {
    let store: Arc<dyn Store + Send + 'static> = Arc::new(MemStore::default());
    roundtrip(store).await;
}
