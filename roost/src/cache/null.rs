use async_trait::async_trait;
use roost_core::{Clock, Request, Response, SystemClock, Url};

use super::{CacheEntry, CacheManager};
use crate::config::CachePolicy;

/// Cache manager that never stores anything.
///
/// Accessors built without a cache manager use this one, so every request
/// goes to the origin.
#[derive(Debug, Default, Clone)]
pub struct NullCacheManager {
    policy: CachePolicy,
}

#[async_trait]
impl CacheManager for NullCacheManager {
    async fn entry(&self, _request: &Request) -> Option<CacheEntry> {
        None
    }

    async fn put(&self, _request: &Request, _response: Response) {}

    async fn remove(&self, _request: &Request) {}

    async fn invalidate(&self, _uri: &Url) {}

    fn clock(&self) -> &dyn Clock {
        &SystemClock
    }

    fn policy(&self) -> &CachePolicy {
        &self.policy
    }
}
