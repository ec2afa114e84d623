use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use roost_core::{Clock, Options, Request, Response, SystemClock, Url};
use roost_store::{DeleteStatus, Format, Store, StoreError, StoreResult, store_key};
use tracing::{trace, warn};

use super::{CacheEntry, CacheEntryCollection, CacheManager};
use crate::{Error, config::CachePolicy, metrics};

/// Cache manager persisting collections in an external [`Store`].
///
/// Each URI's [`CacheEntryCollection`] is encoded as one value under
/// [`store_key`]. Storing is a read-modify-write of that value: two
/// concurrent stores for the same URI may race and the last writer wins,
/// dropping the other's variant. The stored value is always one complete
/// encoding, never a mix of both.
///
/// Store failures, timeouts and undecodable values are logged and treated
/// as a miss.
pub struct SharedCacheManager<S> {
    store: S,
    format: Format,
    clock: Arc<dyn Clock>,
    policy: CachePolicy,
}

impl<S> SharedCacheManager<S>
where
    S: Store,
{
    /// Creates a manager over `store` writing bincode values.
    pub fn new(store: S) -> Self {
        SharedCacheManager {
            store,
            format: Format::default(),
            clock: Arc::new(SystemClock),
            policy: CachePolicy::default(),
        }
    }

    /// Creates a manager whose policy is read from `options`.
    pub fn from_options(store: S, options: &Options) -> Result<Self, Error> {
        Ok(Self::new(store).with_policy(CachePolicy::from_options(options)?))
    }

    /// Sets the format of written values. Reads accept every format.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Underlying store.
    pub fn store_ref(&self) -> &S {
        &self.store
    }

    /// Reads and decodes the collection of `uri`. Any failure is `None`.
    pub async fn load(&self, uri: &Url) -> Option<CacheEntryCollection> {
        let key = store_key(uri.as_str());
        let raw = match self.bounded(self.store.get(&key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(store = self.store.name(), %uri, %error, "cache read failed, treating as miss");
                return None;
            }
        };
        match Format::decode::<CacheEntryCollection>(&raw) {
            Ok(collection) => Some(collection),
            Err(error) => {
                warn!(store = self.store.name(), %uri, %error, "undecodable cache value, treating as miss");
                None
            }
        }
    }

    async fn save(&self, uri: &Url, collection: &CacheEntryCollection) {
        let key = store_key(uri.as_str());
        let result = match self.format.encode(collection) {
            Ok(value) => self.bounded(self.store.set(&key, value)).await,
            Err(error) => Err(StoreError::from(error)),
        };
        if let Err(error) = result {
            warn!(store = self.store.name(), %uri, %error, "cache write failed");
        }
    }

    async fn delete(&self, uri: &Url) -> Option<DeleteStatus> {
        let key = store_key(uri.as_str());
        match self.bounded(self.store.delete(&key)).await {
            Ok(status) => Some(status),
            Err(error) => {
                warn!(store = self.store.name(), %uri, %error, "cache delete failed");
                None
            }
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match self.policy.store_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(StoreError::ConnectionError(Box::new(StoreTimeout(limit))))),
            None => call.await,
        }
    }
}

impl<S: Store> std::fmt::Debug for SharedCacheManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCacheManager")
            .field("store", &self.store.name())
            .field("format", &self.format)
            .field("clock", &self.clock)
            .field("policy", &self.policy)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("store call exceeded {0:?}")]
struct StoreTimeout(Duration);

#[async_trait]
impl<S> CacheManager for SharedCacheManager<S>
where
    S: Store,
{
    async fn entry(&self, request: &Request) -> Option<CacheEntry> {
        let entry = self
            .load(request.uri())
            .await
            .and_then(|collection| collection.lookup(request).cloned());
        if entry.is_none() {
            metrics::record_miss();
        }
        entry
    }

    async fn put(&self, request: &Request, response: Response) {
        let mut collection = self.load(request.uri()).await.unwrap_or_default();
        let now = self.clock.now();
        if collection.store(request.clone(), response, now) {
            trace!(uri = %request.uri(), variants = collection.len(), "shared store");
            self.save(request.uri(), &collection).await;
        }
    }

    async fn remove(&self, request: &Request) {
        let Some(mut collection) = self.load(request.uri()).await else {
            return;
        };
        if collection.remove_matching(request) == 0 {
            return;
        }
        if collection.is_empty() {
            self.delete(request.uri()).await;
        } else {
            self.save(request.uri(), &collection).await;
        }
    }

    async fn invalidate(&self, uri: &Url) {
        if let Some(status) = self.delete(uri).await {
            metrics::record_invalidation();
            trace!(%uri, ?status, "shared invalidate");
        }
    }

    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn policy(&self) -> &CachePolicy {
        &self.policy
    }
}
