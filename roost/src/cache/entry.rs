use chrono::{DateTime, Utc};
use roost_core::{CacheControl, HeaderSet, Request, Response};
use serde::{Deserialize, Serialize};

use super::freshness;

/// One stored request/response pair with its freshness metadata.
///
/// Entries are never mutated after creation. A revalidation builds a new
/// entry and swaps it into the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    request: Request,
    response: Response,
    stored_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    must_revalidate: bool,
}

impl CacheEntry {
    /// Captures `response` to `request` as stored at `stored_at`.
    pub fn new(request: Request, response: Response, stored_at: DateTime<Utc>) -> Self {
        let expires_at = freshness::expires_at(response.headers(), stored_at);
        let must_revalidate = response
            .cache_control()
            .is_some_and(|cache_control| cache_control.must_revalidate());
        CacheEntry {
            request,
            response,
            stored_at,
            expires_at,
            must_revalidate,
        }
    }

    /// The request that produced the stored response.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The stored response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// When the response was stored or last revalidated.
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// End of the freshness lifetime; `None` means stale from the start.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// The origin asked for `must-revalidate`.
    pub fn must_revalidate(&self) -> bool {
        self.must_revalidate
    }

    /// `age < freshness lifetime` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now < expires_at)
    }

    /// Request-header names listed in the stored response's `Vary`.
    pub fn vary(&self) -> impl Iterator<Item = &str> {
        self.response.headers().get_list("vary")
    }

    /// `true` when `request` selects this entry: every header named by
    /// `Vary` carries the same values as in the stored request.
    pub fn matches(&self, request: &Request) -> bool {
        self.vary().all(|name| {
            let name = name.to_ascii_lowercase();
            self.request.headers().get(&name) == request.headers().get(&name)
        })
    }

    /// Headers turning a request for this entry into a conditional one.
    ///
    /// `If-None-Match` comes from `ETag`, `If-Modified-Since` from
    /// `Last-Modified`. Entries marked `must-revalidate` also ask
    /// intermediaries to revalidate with `Cache-Control: max-age=0`.
    pub fn conditional_headers(&self) -> HeaderSet {
        let mut headers = HeaderSet::new();
        let stored = self.response.headers();
        if let Some(etag) = stored.get_one("etag") {
            headers.set("If-None-Match", etag);
        }
        if let Some(last_modified) = stored.get_one("last-modified") {
            headers.set("If-Modified-Since", last_modified);
        }
        if self.must_revalidate {
            headers.set("Cache-Control", "max-age=0");
        }
        headers
    }

    /// `true` when the stored response can answer a conditional request.
    pub fn is_validatable(&self) -> bool {
        let stored = self.response.headers();
        stored.contains("etag") || stored.contains("last-modified")
    }

    /// Parsed `Cache-Control` of the stored response.
    pub fn cache_control(&self) -> Option<CacheControl> {
        self.response.cache_control()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::{TimeDelta, TimeZone};
    use roost_core::{StatusCode, Url};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn entry(request: Request, headers: &[(&str, &str)]) -> CacheEntry {
        let response = Response::new(
            StatusCode::OK,
            headers.iter().copied().collect(),
            Bytes::from_static(b"hello"),
            request.clone(),
            request.uri().clone(),
        );
        CacheEntry::new(request, response, now())
    }

    fn request() -> Request {
        Request::get(Url::parse("http://example.com/").unwrap())
    }

    #[test]
    fn freshness_window() {
        let entry = entry(request(), &[("Cache-Control", "max-age=3600")]);
        assert!(entry.is_fresh(now() + TimeDelta::seconds(1800)));
        assert!(!entry.is_fresh(now() + TimeDelta::seconds(3600)));
        assert!(!entry.is_fresh(now() + TimeDelta::seconds(3601)));
    }

    #[test]
    fn vary_matching_uses_listed_headers_only() {
        let html = request()
            .with_header("Accept", "text/html")
            .with_header("User-Agent", "a");
        let entry = entry(html, &[("Vary", "accept")]);

        let same = request()
            .with_header("accept", "text/html")
            .with_header("User-Agent", "b");
        let json = request().with_header("Accept", "application/json");

        assert!(entry.matches(&same));
        assert!(!entry.matches(&json));
        assert!(!entry.matches(&request()));
    }

    #[test]
    fn no_vary_matches_everything() {
        let entry = entry(request().with_header("Accept", "text/html"), &[]);
        assert!(entry.matches(&request().with_header("Accept", "image/png")));
    }

    #[test]
    fn conditional_headers_from_validators() {
        let entry = entry(
            request(),
            &[
                ("ETag", "\"v1\""),
                ("Last-Modified", "Fri, 23 May 2008 12:00:00 GMT"),
                ("Cache-Control", "max-age=0, must-revalidate"),
            ],
        );
        let headers = entry.conditional_headers();
        assert_eq!(headers.get_one("if-none-match"), Some("\"v1\""));
        assert_eq!(
            headers.get_one("if-modified-since"),
            Some("Fri, 23 May 2008 12:00:00 GMT")
        );
        assert_eq!(headers.get_one("cache-control"), Some("max-age=0"));
        assert!(entry.must_revalidate());
    }
}
