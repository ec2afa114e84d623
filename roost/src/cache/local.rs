use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use roost_core::{Clock, Options, Request, Response, SystemClock, Url};
use tokio::sync::RwLock;
use tracing::trace;

use super::{CacheEntry, CacheEntryCollection, CacheManager};
use crate::{Error, config::CachePolicy, metrics};

type Slot = Arc<RwLock<CacheEntryCollection>>;

/// Process-local cache manager.
///
/// Collections live in a concurrent map keyed by URI. Each collection sits
/// behind its own lock: lookups of one URI run concurrently, writes to one
/// URI are serialized, and different URIs never wait on each other.
///
/// ```
/// use roost::cache::LocalCacheManager;
///
/// let manager = LocalCacheManager::new();
/// assert!(manager.is_empty());
/// ```
#[derive(Debug)]
pub struct LocalCacheManager {
    collections: DashMap<String, Slot>,
    clock: Arc<dyn Clock>,
    policy: CachePolicy,
}

impl Default for LocalCacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCacheManager {
    /// Creates an empty manager using wall-clock time and the default policy.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty manager using `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        LocalCacheManager {
            collections: DashMap::new(),
            clock,
            policy: CachePolicy::default(),
        }
    }

    /// Replaces the policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates a manager whose policy is read from `options`.
    pub fn from_options(options: &Options) -> Result<Self, Error> {
        Ok(Self::new().with_policy(CachePolicy::from_options(options)?))
    }

    /// Number of URIs with a collection.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Snapshot of the collection stored for `uri`.
    pub async fn collection(&self, uri: &Url) -> Option<CacheEntryCollection> {
        let slot = self.slot(uri)?;
        let collection = slot.read().await;
        Some(collection.clone())
    }

    // The map guard is released before any lock is awaited.
    fn slot(&self, uri: &Url) -> Option<Slot> {
        self.collections
            .get(uri.as_str())
            .map(|slot| Arc::clone(slot.value()))
    }

    fn slot_or_default(&self, uri: &Url) -> Slot {
        let slot = self.collections.entry(uri.as_str().to_owned()).or_default();
        Arc::clone(slot.value())
    }
}

#[async_trait]
impl CacheManager for LocalCacheManager {
    async fn entry(&self, request: &Request) -> Option<CacheEntry> {
        let Some(slot) = self.slot(request.uri()) else {
            metrics::record_miss();
            return None;
        };
        let collection = slot.read().await;
        let entry = collection.lookup(request).cloned();
        if entry.is_none() {
            metrics::record_miss();
        }
        entry
    }

    async fn put(&self, request: &Request, response: Response) {
        let slot = self.slot_or_default(request.uri());
        let now = self.clock.now();
        let mut collection = slot.write().await;
        let stored = collection.store(request.clone(), response, now);
        trace!(uri = %request.uri(), stored, variants = collection.len(), "local store");
    }

    async fn remove(&self, request: &Request) {
        if let Some(slot) = self.slot(request.uri()) {
            let removed = slot.write().await.remove_matching(request);
            trace!(uri = %request.uri(), removed, "local remove");
        }
    }

    async fn invalidate(&self, uri: &Url) {
        if self.collections.remove(uri.as_str()).is_some() {
            metrics::record_invalidation();
            trace!(%uri, "local invalidate");
        }
    }

    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn policy(&self) -> &CachePolicy {
        &self.policy
    }
}
