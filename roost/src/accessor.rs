use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use roost_core::{AuthProvider, HeaderSet, Method, Options, Response, Transport, Url};
use tracing::debug;

use crate::{
    Error, Result,
    cache::{CacheManager, LocalCacheManager, NullCacheManager},
    config::{AccessorConfig, AccessorOptions, CacheMode},
    resource::Resource,
};

/// State shared by an accessor and every resource it handed out.
pub(crate) struct Engine {
    pub transport: Arc<dyn Transport>,
    pub cache: Arc<dyn CacheManager>,
    pub auth: Option<Arc<dyn AuthProvider>>,
    pub config: AccessorConfig,
    stubs: DashMap<String, Stub>,
}

#[derive(Debug, Clone)]
pub(crate) struct Stub {
    pub content_type: String,
    pub body: Bytes,
}

impl Engine {
    pub fn stub(&self, uri: &Url) -> Option<Stub> {
        self.stubs.get(uri.as_str()).map(|stub| stub.clone())
    }
}

/// Entry point of the client.
///
/// An accessor owns the transport, the cache manager, the optional
/// credentials provider and the pipeline configuration. It hands out one
/// [`Resource`] per URI and keeps handing out the same one, so state such as
/// the effective URI and the redirect callback survives between calls.
///
/// Accessors are cheap to clone; clones share resources and cache.
#[derive(Clone)]
pub struct HttpAccessor {
    engine: Arc<Engine>,
    resources: Arc<DashMap<String, Resource>>,
}

impl HttpAccessor {
    /// Starts building an accessor around `transport`.
    pub fn builder<T>(transport: T) -> HttpAccessorBuilder
    where
        T: Transport + 'static,
    {
        HttpAccessorBuilder {
            transport: Arc::new(transport),
            cache: None,
            auth: None,
            config: AccessorConfig::default(),
        }
    }

    /// Accessor without cache or credentials.
    pub fn new<T>(transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self::builder(transport).build()
    }

    /// Builds an accessor from an option map.
    ///
    /// Recognized options: `timeout`, `max_redirects`, `user_agent`, `cache`
    /// (`"none"` or `"local"`), `force_revalidate` and `store_timeout`.
    pub fn from_options<T>(transport: T, options: &Options) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let options = AccessorOptions::from_options(options)?;
        let cache: Arc<dyn CacheManager> = match options.cache {
            CacheMode::None => Arc::new(NullCacheManager::default()),
            CacheMode::Local => Arc::new(LocalCacheManager::new().with_policy(options.policy)),
        };
        Ok(Self::builder(transport)
            .config(options.config)
            .shared_cache_manager(cache)
            .build())
    }

    /// The remembered resource for `uri`, created on first use.
    pub fn resource(&self, uri: &str) -> Result<Resource> {
        let uri = Url::parse(uri).map_err(|source| Error::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;
        Ok(self.resource_for(uri))
    }

    /// Same as [`HttpAccessor::resource`] for an already parsed URI.
    pub fn resource_for(&self, uri: Url) -> Resource {
        self.resources
            .entry(uri.as_str().to_owned())
            .or_insert_with(|| {
                debug!(%uri, "new resource");
                Resource::new(Arc::clone(&self.engine), uri)
            })
            .clone()
    }

    /// `GET` `uri`.
    pub async fn get(&self, uri: &str, headers: impl Into<Option<HeaderSet>>) -> Result<Response> {
        let headers = headers.into();
        self.resource(uri)?.get(headers).await
    }

    /// `POST` `body` to `uri`.
    pub async fn post(
        &self,
        uri: &str,
        body: impl Into<Bytes>,
        headers: impl Into<Option<HeaderSet>>,
    ) -> Result<Response> {
        let (body, headers) = (body.into(), headers.into());
        self.resource(uri)?.post(body, headers).await
    }

    /// `PUT` `body` to `uri`.
    pub async fn put(
        &self,
        uri: &str,
        body: impl Into<Bytes>,
        headers: impl Into<Option<HeaderSet>>,
    ) -> Result<Response> {
        let (body, headers) = (body.into(), headers.into());
        self.resource(uri)?.put(body, headers).await
    }

    /// `DELETE` `uri`.
    pub async fn delete(
        &self,
        uri: &str,
        headers: impl Into<Option<HeaderSet>>,
    ) -> Result<Response> {
        let headers = headers.into();
        self.resource(uri)?.delete(headers).await
    }

    /// Answers every later `GET` of `uri` with a canned `200` carrying
    /// `content_type` and `body`, without touching transport or cache.
    ///
    /// Only `GET` can be stubbed; other methods fail with
    /// [`Error::InvalidStub`].
    pub fn stub_request(
        &self,
        method: Method,
        uri: &str,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<()> {
        if method != Method::GET {
            return Err(Error::InvalidStub(method));
        }
        let parsed = Url::parse(uri).map_err(|source| Error::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;
        self.engine.stubs.insert(
            parsed.as_str().to_owned(),
            Stub {
                content_type: content_type.to_owned(),
                body: body.into(),
            },
        );
        Ok(())
    }

    /// Cache manager in use.
    pub fn cache_manager(&self) -> &Arc<dyn CacheManager> {
        &self.engine.cache
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &AccessorConfig {
        &self.engine.config
    }
}

impl std::fmt::Debug for HttpAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAccessor")
            .field("transport", &self.engine.transport.name())
            .field("cache", &self.engine.cache)
            .field("auth", &self.engine.auth.is_some())
            .field("config", &self.engine.config)
            .field("resources", &self.resources.len())
            .finish()
    }
}

/// Builder for [`HttpAccessor`].
pub struct HttpAccessorBuilder {
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn CacheManager>>,
    auth: Option<Arc<dyn AuthProvider>>,
    config: AccessorConfig,
}

impl HttpAccessorBuilder {
    /// Cache manager to consult. Without one nothing is cached.
    #[must_use]
    pub fn cache_manager<C>(self, cache: C) -> Self
    where
        C: CacheManager + 'static,
    {
        self.shared_cache_manager(Arc::new(cache))
    }

    /// Cache manager shared with other accessors.
    #[must_use]
    pub fn shared_cache_manager(mut self, cache: Arc<dyn CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Credentials provider asked when the origin answers `401`.
    #[must_use]
    pub fn auth_provider<A>(mut self, auth: A) -> Self
    where
        A: AuthProvider + 'static,
    {
        self.auth = Some(Arc::new(auth));
        self
    }

    /// Pipeline configuration.
    #[must_use]
    pub fn config(mut self, config: AccessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Finishes the accessor.
    pub fn build(self) -> HttpAccessor {
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(NullCacheManager::default()));
        HttpAccessor {
            engine: Arc::new(Engine {
                transport: self.transport,
                cache,
                auth: self.auth,
                config: self.config,
                stubs: DashMap::new(),
            }),
            resources: Arc::new(DashMap::new()),
        }
    }
}
