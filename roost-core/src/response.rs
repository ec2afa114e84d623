//! Response type and its one-time cacheability evaluation.

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{CacheControl, HeaderSet, RawResponse, Request};

/// A response together with the request that produced it.
///
/// `authoritative` tells whether the origin confirmed this representation
/// (fresh fetch or successful revalidation). Responses served straight from
/// cache are not authoritative.
///
/// `cacheable` is computed once, when the response is created, from its
/// status, its headers and the originating request. It never changes for the
/// lifetime of the value.
///
/// Equality compares status, headers and body only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(with = "http_serde::status_code")]
    status: StatusCode,
    headers: HeaderSet,
    body: Bytes,
    request: Request,
    effective_uri: Url,
    authoritative: bool,
    cacheable: bool,
}

impl Response {
    /// Creates an authoritative response and evaluates its cacheability.
    pub fn new(
        status: StatusCode,
        headers: HeaderSet,
        body: Bytes,
        request: Request,
        effective_uri: Url,
    ) -> Self {
        let cacheable = evaluate_cacheable(status, &headers, &request);
        Response {
            status,
            headers,
            body,
            request,
            effective_uri,
            authoritative: true,
            cacheable,
        }
    }

    /// Builds a response from transport output.
    ///
    /// Fails with the offending code when the status is outside `100..=599`.
    pub fn from_raw(raw: RawResponse, request: Request, effective_uri: Url) -> Result<Self, u16> {
        if !(100..=599).contains(&raw.status) {
            return Err(raw.status);
        }
        let status = StatusCode::from_u16(raw.status).map_err(|_| raw.status)?;
        Ok(Self::new(status, raw.headers, raw.body, request, effective_uri))
    }

    /// Status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Shortcut for `headers().get(name)`.
    pub fn header(&self, name: &str) -> &[String] {
        self.headers.get(name)
    }

    /// Response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The request this response answers.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// URI that produced this response.
    pub fn effective_uri(&self) -> &Url {
        &self.effective_uri
    }

    /// `true` when the origin confirmed this representation.
    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    /// `true` when the response may be stored by a cache.
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Parsed `Cache-Control` of this response.
    pub fn cache_control(&self) -> Option<CacheControl> {
        CacheControl::from_headers(&self.headers)
    }

    /// Returns a copy with the given authority flag.
    #[must_use]
    pub fn with_authoritative(mut self, authoritative: bool) -> Self {
        self.authoritative = authoritative;
        self
    }

    /// Returns a copy reporting another effective URI.
    #[must_use]
    pub fn with_effective_uri(mut self, effective_uri: Url) -> Self {
        self.effective_uri = effective_uri;
        self
    }

    /// Returns a copy with another body. Used to answer `HEAD` from a stored
    /// `GET`.
    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Consumes the response, returning its parts.
    pub fn into_parts(self) -> (StatusCode, HeaderSet, Bytes, Request) {
        (self.status, self.headers, self.body, self.request)
    }
}

impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status && self.headers == other.headers && self.body == other.body
    }
}

/// Decides whether a response may be stored.
///
/// A response is not cacheable when it:
/// - has a status outside 2xx/3xx, or is `206` or `304`
/// - carries `Vary: *`
/// - carries `Cache-Control: no-store`
/// - answers a request with `Authorization` and does not explicitly allow it
pub fn evaluate_cacheable(status: StatusCode, headers: &HeaderSet, request: &Request) -> bool {
    let status_ok = (status.is_success() || status.is_redirection())
        && status != StatusCode::PARTIAL_CONTENT
        && status != StatusCode::NOT_MODIFIED;
    if !status_ok {
        return false;
    }
    if headers.get_list("vary").any(|name| name == "*") {
        return false;
    }
    let cache_control = CacheControl::from_headers(headers);
    if cache_control.as_ref().is_some_and(CacheControl::no_store) {
        return false;
    }
    if request.headers().contains("authorization") {
        return cache_control
            .as_ref()
            .is_some_and(CacheControl::allows_authorized_caching);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::get(Url::parse("http://example.com/").unwrap())
    }

    fn response(status: u16, headers: &[(&str, &str)]) -> Response {
        Response::new(
            StatusCode::from_u16(status).unwrap(),
            headers.iter().copied().collect(),
            Bytes::from_static(b"body"),
            request(),
            request().uri().clone(),
        )
    }

    #[test]
    fn plain_ok_is_cacheable_and_authoritative() {
        let response = response(200, &[("Content-Type", "text/plain")]);
        assert!(response.is_cacheable());
        assert!(response.is_authoritative());
    }

    #[test]
    fn vary_star_is_not_cacheable() {
        assert!(!response(200, &[("Vary", "Accept, *")]).is_cacheable());
    }

    #[test]
    fn no_store_is_not_cacheable() {
        assert!(!response(200, &[("Cache-Control", "max-age=60, no-store")]).is_cacheable());
    }

    #[test]
    fn errors_and_partials_are_not_cacheable() {
        assert!(!response(500, &[]).is_cacheable());
        assert!(!response(404, &[]).is_cacheable());
        assert!(!response(206, &[]).is_cacheable());
        assert!(!response(304, &[]).is_cacheable());
    }

    #[test]
    fn authorized_requests_need_explicit_permission() {
        let authorized = request().with_header("Authorization", "Basic Zm9vOmJhcg==");
        let headers: HeaderSet = [("Cache-Control", "max-age=60")].into_iter().collect();
        assert!(!evaluate_cacheable(StatusCode::OK, &headers, &authorized));

        let headers: HeaderSet = [("Cache-Control", "public, max-age=60")]
            .into_iter()
            .collect();
        assert!(evaluate_cacheable(StatusCode::OK, &headers, &authorized));
    }

    #[test]
    fn cacheability_survives_authority_changes() {
        let cached = response(200, &[("Vary", "*")]).with_authoritative(false);
        assert!(!cached.is_cacheable());
        assert!(!cached.is_authoritative());
    }

    #[test]
    fn equality_ignores_authority() {
        let fresh = response(200, &[("ETag", "\"1\"")]);
        let cached = fresh.clone().with_authoritative(false);
        assert_eq!(fresh, cached);
    }

    #[test]
    fn invalid_status_from_transport() {
        let raw = RawResponse {
            status: 1000,
            headers: HeaderSet::new(),
            body: Bytes::new(),
        };
        let result = Response::from_raw(raw, request(), request().uri().clone());
        assert_eq!(result.unwrap_err(), 1000);
    }
}
