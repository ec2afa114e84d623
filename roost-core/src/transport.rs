//! Transport capability: the component that actually puts a request on the
//! wire.
//!
//! The pipeline never opens sockets itself. It hands a method, URI, headers
//! and body to a [`Transport`] and receives the status, headers and body of the
//! reply. Proxies, TLS and connection pooling are the transport's concern.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use thiserror::Error;
use url::Url;

use crate::HeaderSet;

/// Transport output, before status validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Status code as received.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderSet,
    /// Fully read body.
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a response without headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        RawResponse {
            status,
            headers: HeaderSet::new(),
            body: body.into(),
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// Transport failure.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The origin could not be reached or the exchange broke off.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The transport gave up waiting.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Issues HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the complete reply.
    async fn send(
        &self,
        method: &Method,
        uri: &Url,
        headers: &HeaderSet,
        body: Option<&Bytes>,
    ) -> TransportResult<RawResponse>;

    /// Returns the name of this transport for logging.
    fn name(&self) -> &str {
        "transport"
    }
}

#[async_trait]
impl Transport for &dyn Transport {
    async fn send(
        &self,
        method: &Method,
        uri: &Url,
        headers: &HeaderSet,
        body: Option<&Bytes>,
    ) -> TransportResult<RawResponse> {
        (*self).send(method, uri, headers, body).await
    }

    fn name(&self) -> &str {
        (*self).name()
    }
}

#[async_trait]
impl Transport for Box<dyn Transport> {
    async fn send(
        &self,
        method: &Method,
        uri: &Url,
        headers: &HeaderSet,
        body: Option<&Bytes>,
    ) -> TransportResult<RawResponse> {
        (**self).send(method, uri, headers, body).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl Transport for Arc<dyn Transport> {
    async fn send(
        &self,
        method: &Method,
        uri: &Url,
        headers: &HeaderSet,
        body: Option<&Bytes>,
    ) -> TransportResult<RawResponse> {
        (**self).send(method, uri, headers, body).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
