use std::{sync::Arc, time::Instant};

use bytes::Bytes;
use parking_lot::RwLock;
use roost_core::{
    AuthProvider, HeaderSet, Method, RawResponse, Request, Response, StatusCode, Transport, Url,
    auth::parse_realm,
};
use tracing::{Instrument, debug, debug_span, warn};

use super::State;
use crate::{
    Error, Result,
    cache::{CacheEntry, CacheManager},
    config::AccessorConfig,
    metrics,
};

/// Callback consulted before following a redirect. Returning `false` stops
/// the pipeline and hands the 3xx response to the caller.
pub type RedirectCallback = Arc<dyn Fn() -> bool + Send + Sync>;

/// Redirect statuses the pipeline follows.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Orchestrates one logical request: cache check, (conditional) fetch,
/// revalidation merge and redirects.
pub struct Pipeline<'a> {
    /// Issues wire requests.
    pub transport: &'a dyn Transport,
    /// Consulted for GET/HEAD and invalidated by other methods.
    pub cache: &'a dyn CacheManager,
    /// Asked for credentials after a `401`.
    pub auth: Option<&'a dyn AuthProvider>,
    /// Timeout, redirect limit and user agent.
    pub config: &'a AccessorConfig,
    /// Canonical URI of the resource, rewritten by permanent redirects.
    pub effective_uri: &'a RwLock<Url>,
    /// Redirect veto.
    pub redirect_callback: Option<RedirectCallback>,
}

impl Pipeline<'_> {
    /// Runs the state machine to completion.
    pub async fn run(&self, request: Request) -> Result<Response> {
        let request = self.prepare(request);
        let mut redirects = 0;
        let mut state = self.start(request);
        loop {
            debug!(?state, "pipeline state");
            state = match state {
                State::Done(response) => return Ok(response),
                State::CacheCheck { request } => {
                    let span = debug_span!("pipeline.CacheCheck", uri = %request.uri());
                    self.cache_check(request).instrument(span).await
                }
                State::Fetching { request, stale } => {
                    let span = debug_span!(
                        "pipeline.Fetching",
                        method = %request.method(),
                        uri = %request.uri(),
                        conditional = stale.is_some()
                    );
                    self.fetch(request, stale).instrument(span).await?
                }
                State::Revalidating {
                    request,
                    stale,
                    headers,
                } => {
                    let span = debug_span!("pipeline.Revalidating", uri = %request.uri());
                    self.revalidate(request, stale, headers)
                        .instrument(span)
                        .await
                }
                State::Redirecting { request, response } => {
                    let span = debug_span!(
                        "pipeline.Redirecting",
                        status = %response.status(),
                        from = %request.uri()
                    );
                    span.in_scope(|| self.redirect(request, response, &mut redirects))?
                }
            };
        }
    }

    fn prepare(&self, request: Request) -> Request {
        match &self.config.user_agent {
            Some(user_agent) if !request.headers().contains("user-agent") => {
                request.with_header("User-Agent", user_agent.clone())
            }
            _ => request,
        }
    }

    fn start(&self, request: Request) -> State {
        if request.is_cacheable_method() {
            State::CacheCheck { request }
        } else {
            State::Fetching {
                request,
                stale: None,
            }
        }
    }

    async fn cache_check(&self, request: Request) -> State {
        let Some(entry) = self.cache.lookup_entry(&request).await else {
            debug!("cache miss");
            return State::Fetching {
                request,
                stale: None,
            };
        };
        match self.cache.fresh_response(&entry) {
            Some(response) => {
                debug!("fresh cache hit");
                self.finish(request, response)
            }
            None => {
                debug!(validatable = entry.is_validatable(), "stale entry");
                State::Fetching {
                    request,
                    stale: Some(entry),
                }
            }
        }
    }

    async fn fetch(&self, request: Request, stale: Option<CacheEntry>) -> Result<State> {
        let mut headers = request.headers().clone();
        if let Some(entry) = &stale {
            let conditional = entry.conditional_headers();
            for (name, value) in conditional.iter() {
                headers.set(name, value);
            }
        }

        let mut raw = self.send(&request, &headers).await?;
        if raw.status == StatusCode::UNAUTHORIZED.as_u16()
            && let Some(auth) = self.auth
        {
            let realm = raw
                .headers
                .get_one("www-authenticate")
                .and_then(parse_realm);
            match auth.credentials_for(request.uri(), realm.as_deref()).await {
                Some(credentials) => {
                    debug!(?realm, username = credentials.username(), "retrying with credentials");
                    headers.set("Authorization", credentials.basic_authorization());
                    raw = self.send(&request, &headers).await?;
                }
                None => debug!(?realm, "no credentials for challenge"),
            }
        }

        let sent = request.clone().with_headers(headers);
        let response = Response::from_raw(raw, sent, request.uri().clone()).map_err(|status| {
            Error::InvalidResponse(format!("status code {status} is outside 100..=599"))
        })?;

        if !request.is_cacheable_method() {
            self.cache.invalidate(request.uri()).await;
        }

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(match stale {
                Some(stale) if request.is_cacheable_method() => State::Revalidating {
                    request,
                    stale,
                    headers: response.headers().clone(),
                },
                _ => State::Done(response),
            });
        }

        if request.method() == Method::GET {
            let stored = self.cache.store(&request, &response).await;
            if !stored && stale.is_some() && !response.status().is_server_error() {
                self.cache.remove(&request).await;
            }
        }
        Ok(self.finish(request, response))
    }

    async fn revalidate(
        &self,
        request: Request,
        stale: CacheEntry,
        headers: HeaderSet,
    ) -> State {
        let merged = self.cache.merge_revalidation(&stale, &headers).await;
        debug!(status = %merged.status(), "revalidated stale entry");
        self.finish(request, merged)
    }

    fn redirect(
        &self,
        request: Request,
        response: Response,
        redirects: &mut usize,
    ) -> Result<State> {
        let status = response.status();
        let location = response.headers().get_one("location").ok_or_else(|| {
            Error::InvalidResponse(format!("{status} response without Location header"))
        })?;
        let target = request.uri().join(location).map_err(|error| {
            Error::InvalidResponse(format!("unusable Location {location:?}: {error}"))
        })?;

        if let Some(callback) = &self.redirect_callback
            && !callback()
        {
            debug!(%target, "redirect vetoed by callback");
            return Ok(State::Done(response));
        }
        if *redirects >= self.config.max_redirects {
            warn!(limit = self.config.max_redirects, %target, "redirect limit reached");
            return Err(Error::TooManyRedirects(self.config.max_redirects));
        }
        *redirects += 1;

        let method = if status == StatusCode::SEE_OTHER {
            Method::GET
        } else {
            request.method().clone()
        };
        if matches!(
            status,
            StatusCode::MOVED_PERMANENTLY | StatusCode::PERMANENT_REDIRECT
        ) {
            let mut effective_uri = self.effective_uri.write();
            if *effective_uri == *request.uri() {
                debug!(%target, "permanent redirect, updating effective uri");
                *effective_uri = target.clone();
            }
        }
        debug!(%method, %target, "following redirect");
        Ok(self.start(request.redirected(method, target)))
    }

    /// Terminal bookkeeping shared by every path that produced a response.
    fn finish(&self, request: Request, response: Response) -> State {
        let response = response.with_effective_uri(request.uri().clone());
        let response = if request.method() == Method::HEAD {
            response.with_body(Bytes::new())
        } else {
            response
        };
        if is_redirect(response.status()) {
            State::Redirecting { request, response }
        } else {
            State::Done(response)
        }
    }

    async fn send(&self, request: &Request, headers: &HeaderSet) -> Result<RawResponse> {
        let started = Instant::now();
        let call = self
            .transport
            .send(request.method(), request.uri(), headers, request.body());
        let raw = tokio::time::timeout(self.config.timeout, call)
            .await
            .map_err(|_| Error::Timeout(self.config.timeout))??;
        metrics::record_upstream(self.transport.name(), raw.status, started.elapsed());
        debug!(status = raw.status, transport = self.transport.name(), "transport answered");
        Ok(raw)
    }
}
