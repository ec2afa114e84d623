use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use roost_store::{DeleteStatus, Store, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct StoreCounters {
    pub get_count: AtomicUsize,
    pub get_hit_count: AtomicUsize,
    pub set_count: AtomicUsize,
    pub delete_count: AtomicUsize,
}

impl StoreCounters {
    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }

    pub fn get_hit_count(&self) -> usize {
        self.get_hit_count.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> usize {
        self.set_count.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.get_count.store(0, Ordering::SeqCst);
        self.get_hit_count.store(0, Ordering::SeqCst);
        self.set_count.store(0, Ordering::SeqCst);
        self.delete_count.store(0, Ordering::SeqCst);
    }
}

/// In-memory store counting every call. Clones share data and counters.
#[derive(Clone, Debug, Default)]
pub struct MockStore {
    pub data: Arc<DashMap<String, Bytes>>,
    pub counters: Arc<StoreCounters>,
    delay: Option<Duration>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn raw(&self, key: &str) -> Option<Bytes> {
        self.data.get(key).map(|value| value.clone())
    }

    /// Writes bytes directly, bypassing counters.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Store for MockStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        self.pause().await;
        self.counters.get_count.fetch_add(1, Ordering::SeqCst);
        let value = self.raw(key);
        if value.is_some() {
            self.counters.get_hit_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.pause().await;
        self.counters.set_count.fetch_add(1, Ordering::SeqCst);
        self.data.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<DeleteStatus> {
        self.pause().await;
        self.counters.delete_count.fetch_add(1, Ordering::SeqCst);
        match self.data.remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Store whose every call fails with a connection error.
#[derive(Clone, Debug, Default)]
pub struct FailingStore {
    pub calls: Arc<AtomicUsize>,
}

impl FailingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::ConnectionError(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "store unavailable",
        ))))
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<Bytes>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: Bytes) -> StoreResult<()> {
        self.fail()
    }

    async fn delete(&self, _key: &str) -> StoreResult<DeleteStatus> {
        self.fail()
    }

    fn name(&self) -> &str {
        "failing"
    }
}
