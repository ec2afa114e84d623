//! Outbound request type.

use bytes::Bytes;
use http::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::HeaderSet;

/// An outbound HTTP request.
///
/// Requests are immutable once built: the pipeline derives new requests
/// (conditional headers, redirects, credentials) instead of mutating the
/// caller's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(with = "http_serde::method")]
    method: Method,
    uri: Url,
    headers: HeaderSet,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a request without headers or body.
    pub fn new(method: Method, uri: Url) -> Self {
        Request {
            method,
            uri,
            headers: HeaderSet::new(),
            body: None,
        }
    }

    /// Shortcut for a `GET` request.
    pub fn get(uri: Url) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Replaces the header set.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    /// Appends one header value.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URI.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Request body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// `GET` and `HEAD` are the only methods answered from cache.
    pub fn is_cacheable_method(&self) -> bool {
        matches!(self.method, Method::GET | Method::HEAD)
    }

    /// Returns a copy of this request aimed at another method and URI.
    ///
    /// A switch to `GET` drops the body.
    pub fn redirected(&self, method: Method, uri: Url) -> Self {
        let body = if method == Method::GET || method == Method::HEAD {
            None
        } else {
            self.body.clone()
        };
        Request {
            method,
            uri,
            headers: self.headers.clone(),
            body,
        }
    }
}
