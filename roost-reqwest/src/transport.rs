use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, redirect::Policy};
use roost_core::{
    HeaderSet, Method, RawResponse, Transport, TransportError, TransportResult, Url,
};
use tracing::trace;

/// [`Transport`] sending requests with a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Transport over a fresh client with redirects disabled.
    ///
    /// Fails when the client cannot be built, for example when the TLS
    /// backend cannot be initialized.
    pub fn try_new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self {
            client,
            timeout: None,
        })
    }

    /// Like [`try_new`](Self::try_new), with a client-level limit on every
    /// exchange. Hitting it is reported as [`TransportError::Timeout`].
    pub fn try_with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            timeout: Some(timeout),
        })
    }

    /// Transport over an existing client.
    ///
    /// The client should not follow redirects itself, otherwise permanent
    /// redirects never reach the pipeline and resources keep their original
    /// URI. Timeouts of such a client are reported with a zero duration.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Wrapped client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn transport_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout.unwrap_or_default())
        } else {
            TransportError::Connection(Box::new(error))
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        method: &Method,
        uri: &Url,
        headers: &HeaderSet,
        body: Option<&Bytes>,
    ) -> TransportResult<RawResponse> {
        let mut request = self
            .client
            .request(method.clone(), uri.clone())
            .headers(headers.to_header_map());
        if let Some(body) = body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;
        let status = response.status().as_u16();
        let headers = HeaderSet::from(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|error| self.transport_error(error))?;
        trace!(%method, %uri, status, size = body.len(), "reqwest exchange");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}
