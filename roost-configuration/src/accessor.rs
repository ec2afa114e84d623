//! Top-level accessor document.

use std::{sync::Arc, time::Duration};

use roost::{
    AccessorConfig, CachePolicy, Clock, HttpAccessor, SystemClock, Transport,
    cache::CacheManager,
    config::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{cache::CacheConfig, error::ConfigError};

/// Accessor configuration as written in YAML.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigAccessor {
    /// Timeout of one transport call.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// Redirects followed before giving up.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// `User-Agent` sent when the request has none.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Cache manager selection.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Cache behavior knobs.
    #[serde(default)]
    pub policy: CachePolicy,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

impl Default for ConfigAccessor {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: None,
            cache: CacheConfig::default(),
            policy: CachePolicy::default(),
        }
    }
}

impl ConfigAccessor {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Pipeline part of the configuration.
    pub fn accessor_config(&self) -> AccessorConfig {
        AccessorConfig {
            timeout: self.timeout,
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }

    /// Builds the configured cache manager using wall-clock time.
    pub fn cache_manager(&self) -> Result<Arc<dyn CacheManager>, ConfigError> {
        self.cache_manager_with_clock(Arc::new(SystemClock))
    }

    /// Builds the configured cache manager reading time from `clock`.
    pub fn cache_manager_with_clock(
        &self,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<dyn CacheManager>, ConfigError> {
        self.cache
            .clone()
            .into_cache_manager(self.policy.clone(), clock)
    }

    /// Builds an accessor sending requests through `transport`.
    pub fn into_accessor<T>(self, transport: T) -> Result<HttpAccessor, ConfigError>
    where
        T: Transport + 'static,
    {
        let cache = self.cache_manager()?;
        debug!(?cache, timeout = ?self.timeout, "accessor from configuration");
        Ok(HttpAccessor::builder(transport)
            .config(self.accessor_config())
            .shared_cache_manager(cache)
            .build())
    }
}
