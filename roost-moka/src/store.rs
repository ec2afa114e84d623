use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache;
use roost_store::{DeleteStatus, Store, StoreResult};
use tracing::trace;

use crate::{
    builder::{MokaStoreBuilder, NoCapacity},
    metrics,
};

/// In-memory [`Store`] powered by Moka.
///
/// Reads are lock-free; writes take fine-grained locks. Capacity is bounded
/// by the builder, and least recently used keys are evicted first.
///
/// ```
/// use roost_moka::MokaStore;
///
/// let store = MokaStore::builder().max_entries(1_000).build();
/// assert_eq!(store.entry_count(), 0);
/// ```
///
/// Eviction and expiry are applied lazily by Moka's maintenance tasks, so
/// an evicted key may stay readable for a short while.
#[derive(Clone)]
pub struct MokaStore {
    /// The underlying Moka cache.
    pub cache: Cache<String, Bytes>,
    /// Name reported in logs and metrics.
    pub name: String,
}

impl std::fmt::Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .finish()
    }
}

impl MokaStore {
    /// Starts configuring a store. A capacity must be chosen before `build`.
    pub fn builder() -> MokaStoreBuilder<NoCapacity> {
        MokaStoreBuilder::new()
    }

    /// Approximate number of stored keys.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs Moka's pending maintenance (evictions, expirations) now.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    fn report_capacity(&self) {
        metrics::record_capacity(
            &self.name,
            self.cache.entry_count(),
            self.cache.weighted_size(),
        );
    }
}

#[async_trait]
impl Store for MokaStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        trace!(store = %self.name, key, size = value.len(), "moka insert");
        self.cache.insert(key.to_owned(), value).await;
        self.report_capacity();
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<DeleteStatus> {
        let removed = self.cache.remove(key).await;
        self.report_capacity();
        match removed {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
