use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use roost_core::{HeaderSet, Method, RawResponse, Transport, TransportError, TransportResult, Url};

/// Scripted answer of [`MockTransport`].
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer immediately.
    Respond(RawResponse),
    /// Answer after sleeping.
    Delay(Duration, RawResponse),
    /// Fail with a connection error carrying the message.
    Fail(String),
}

impl From<RawResponse> for Reply {
    fn from(response: RawResponse) -> Self {
        Reply::Respond(response)
    }
}

/// A request as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Url,
    pub headers: HeaderSet,
    pub body: Option<Bytes>,
}

/// Transport answering from per-route scripts and recording every request.
///
/// Replies queued for a route are consumed in order; the last one keeps
/// answering once the others are used up. Requests to unscripted routes
/// fail with a connection error. Clones share scripts and records.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<DashMap<(Method, String), VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn route_key(uri: &str) -> String {
    Url::parse(uri)
        .map(|uri| uri.to_string())
        .unwrap_or_else(|_| uri.to_owned())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reply` for `method uri`.
    pub fn on(&self, method: Method, uri: &str, reply: impl Into<Reply>) -> &Self {
        self.routes
            .entry((method, route_key(uri)))
            .or_default()
            .push_back(reply.into());
        self
    }

    /// Drops every script for `method uri`.
    pub fn clear_route(&self, method: Method, uri: &str) {
        self.routes.remove(&(method, route_key(uri)));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests sent to `uri`, any method.
    pub fn requests_to(&self, uri: &str) -> Vec<RecordedRequest> {
        let key = route_key(uri);
        self.requests
            .lock()
            .iter()
            .filter(|request| request.uri.as_str() == key)
            .cloned()
            .collect()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    fn next_reply(&self, method: &Method, uri: &Url) -> Option<Reply> {
        let mut queue = self
            .routes
            .get_mut(&(method.clone(), uri.as_str().to_owned()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        method: &Method,
        uri: &Url,
        headers: &HeaderSet,
        body: Option<&Bytes>,
    ) -> TransportResult<RawResponse> {
        self.requests.lock().push(RecordedRequest {
            method: method.clone(),
            uri: uri.clone(),
            headers: headers.clone(),
            body: body.cloned(),
        });
        match self.next_reply(method, uri) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Delay(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(Reply::Fail(message)) => Err(TransportError::Connection(message.into())),
            None => Err(TransportError::Connection(
                format!("no scripted reply for {method} {uri}").into(),
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
