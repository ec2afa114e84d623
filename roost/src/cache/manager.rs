use std::fmt::Debug;

use async_trait::async_trait;
use roost_core::{Clock, HeaderSet, Request, Response, Url};
use tracing::debug;

use super::CacheEntry;
use crate::{config::CachePolicy, metrics};

/// Policy layer between the request pipeline and a storage medium.
///
/// Implementors provide raw access to entry collections; freshness,
/// cacheability and revalidation merging are provided on top of it.
/// Implementations swallow storage failures: every method here is
/// infallible from the caller's point of view.
#[async_trait]
pub trait CacheManager: Debug + Send + Sync {
    /// Entry selected by `request`, fresh or not.
    async fn entry(&self, request: &Request) -> Option<CacheEntry>;

    /// Stores `response` for `request` into the URI's collection, stamped
    /// with the manager's current time.
    async fn put(&self, request: &Request, response: Response);

    /// Drops the entries selected by `request`.
    async fn remove(&self, request: &Request);

    /// Drops the whole collection of `uri`.
    async fn invalidate(&self, uri: &Url);

    /// Time source for freshness decisions.
    fn clock(&self) -> &dyn Clock;

    /// Behavior knobs.
    fn policy(&self) -> &CachePolicy;

    /// Fresh cached response for `request`, marked non-authoritative.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        let entry = self.lookup_entry(request).await?;
        self.fresh_response(&entry)
    }

    /// Entry selected by `request` regardless of freshness. The pipeline
    /// uses it to build conditional requests.
    async fn lookup_entry(&self, request: &Request) -> Option<CacheEntry> {
        self.entry(request).await
    }

    /// The entry's response when it may be served without contacting the
    /// origin.
    fn fresh_response(&self, entry: &CacheEntry) -> Option<Response> {
        if self.policy().force_revalidate {
            debug!(uri = %entry.request().uri(), "revalidation forced by policy");
            return None;
        }
        if !entry.is_fresh(self.clock().now()) {
            metrics::record_stale();
            return None;
        }
        metrics::record_hit();
        Some(entry.response().clone().with_authoritative(false))
    }

    /// Stores `response` when it is cacheable. Returns whether it was stored.
    async fn store(&self, request: &Request, response: &Response) -> bool {
        if !response.is_cacheable()
            || response
                .cache_control()
                .is_some_and(|cache_control| cache_control.no_store())
        {
            debug!(uri = %request.uri(), status = %response.status(), "response not cacheable");
            return false;
        }
        self.put(request, response.clone()).await;
        metrics::record_store();
        true
    }

    /// Applies a `304 Not Modified` to a stale entry.
    ///
    /// The merged response keeps the stored body and status, takes the
    /// stored headers overridden by `new_headers`, and is authoritative. It
    /// replaces the stale entry, or evicts it when the merged headers made it
    /// uncacheable.
    async fn merge_revalidation(&self, stale: &CacheEntry, new_headers: &HeaderSet) -> Response {
        let stored = stale.response();
        let mut headers = stored.headers().clone();
        headers.merge(new_headers);
        let merged = Response::new(
            stored.status(),
            headers,
            stored.body().clone(),
            stale.request().clone(),
            stored.effective_uri().clone(),
        );
        if !self.store(stale.request(), &merged).await {
            self.remove(stale.request()).await;
        }
        merged
    }
}
