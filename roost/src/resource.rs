use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use roost_core::{HeaderSet, Method, Request, Response, StatusCode, Url};

use crate::{
    Result,
    accessor::Engine,
    fsm::{Pipeline, RedirectCallback},
};

/// One remote resource, as handed out by
/// [`HttpAccessor::resource`](crate::HttpAccessor::resource).
///
/// A resource remembers its effective URI: a permanent redirect (301/308)
/// rewrites it, so later requests go straight to the new location. Clones
/// share that state.
#[derive(Clone)]
pub struct Resource {
    inner: Arc<ResourceInner>,
}

struct ResourceInner {
    engine: Arc<Engine>,
    uri: Url,
    effective_uri: RwLock<Url>,
    redirect_callback: RwLock<Option<RedirectCallback>>,
}

impl Resource {
    pub(crate) fn new(engine: Arc<Engine>, uri: Url) -> Self {
        Resource {
            inner: Arc::new(ResourceInner {
                engine,
                effective_uri: RwLock::new(uri.clone()),
                uri,
                redirect_callback: RwLock::new(None),
            }),
        }
    }

    /// URI the resource was created for.
    pub fn uri(&self) -> &Url {
        &self.inner.uri
    }

    /// URI requests currently target.
    pub fn effective_uri(&self) -> Url {
        self.inner.effective_uri.read().clone()
    }

    /// Installs the callback consulted before each redirect is followed,
    /// replacing any earlier one. Returning `false` makes the request
    /// return the 3xx response itself.
    pub fn register_redirect_callback<F>(&self, callback: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        *self.inner.redirect_callback.write() = Some(Arc::new(callback));
    }

    /// `GET` the resource.
    pub async fn get(&self, headers: impl Into<Option<HeaderSet>>) -> Result<Response> {
        self.request(Method::GET, headers.into().unwrap_or_default(), None)
            .await
    }

    /// `HEAD` the resource.
    pub async fn head(&self, headers: impl Into<Option<HeaderSet>>) -> Result<Response> {
        self.request(Method::HEAD, headers.into().unwrap_or_default(), None)
            .await
    }

    /// `POST` `body` to the resource.
    pub async fn post(
        &self,
        body: impl Into<Bytes>,
        headers: impl Into<Option<HeaderSet>>,
    ) -> Result<Response> {
        let body = body.into();
        self.request(Method::POST, headers.into().unwrap_or_default(), Some(body))
            .await
    }

    /// `PUT` `body` to the resource.
    pub async fn put(
        &self,
        body: impl Into<Bytes>,
        headers: impl Into<Option<HeaderSet>>,
    ) -> Result<Response> {
        let body = body.into();
        self.request(Method::PUT, headers.into().unwrap_or_default(), Some(body))
            .await
    }

    /// `DELETE` the resource.
    pub async fn delete(&self, headers: impl Into<Option<HeaderSet>>) -> Result<Response> {
        self.request(Method::DELETE, headers.into().unwrap_or_default(), None)
            .await
    }

    /// Issues `method` against the effective URI through the pipeline.
    pub async fn request(
        &self,
        method: Method,
        headers: HeaderSet,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let inner = &self.inner;
        let mut request = Request::new(method, self.effective_uri()).with_headers(headers);
        if let Some(body) = body {
            request = request.with_body(body);
        }

        if request.method() == Method::GET
            && let Some(stub) = inner.engine.stub(request.uri())
        {
            let uri = request.uri().clone();
            let headers = [("Content-Type", stub.content_type)].into_iter().collect();
            return Ok(Response::new(StatusCode::OK, headers, stub.body, request, uri));
        }

        let engine = &inner.engine;
        let pipeline = Pipeline {
            transport: engine.transport.as_ref(),
            cache: engine.cache.as_ref(),
            auth: engine.auth.as_deref(),
            config: &engine.config,
            effective_uri: &inner.effective_uri,
            redirect_callback: inner.redirect_callback.read().clone(),
        };
        pipeline.run(request).await
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("uri", &self.inner.uri)
            .field("effective_uri", &*self.inner.effective_uri.read())
            .finish()
    }
}
