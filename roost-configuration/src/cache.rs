//! Cache manager section.

use std::{sync::Arc, time::Duration};

use roost::{
    CachePolicy, Clock,
    cache::{CacheManager, LocalCacheManager, NullCacheManager},
};
use roost_store::Format;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which cache manager to install.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "type")]
pub enum CacheConfig {
    /// Nothing is cached.
    #[default]
    None,
    /// Process-local cache.
    Local,
    /// Shared cache over an in-memory Moka store.
    Moka(MokaConfig),
    /// Shared cache over Redis.
    Redis(RedisConfig),
}

/// Settings of a Moka store.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MokaConfig {
    /// Maximum number of cached URIs.
    pub max_capacity: u64,
    /// Drop keys this long after their last write (e.g., "1h").
    #[serde(default, with = "humantime_serde")]
    pub time_to_live: Option<Duration>,
    /// Name used in logs and metrics.
    #[serde(default)]
    pub name: Option<String>,
    /// Value format.
    #[serde(default)]
    pub format: Format,
}

/// Settings of a Redis store.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://localhost:6379/0`.
    pub connection_string: String,
    /// Expiry set on written keys (e.g., "1d").
    #[serde(default, with = "humantime_serde")]
    pub ttl: Option<Duration>,
    /// Name used in logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Value format.
    #[serde(default)]
    pub format: Format,
}

impl CacheConfig {
    /// Builds the configured manager with `policy`, reading time from
    /// `clock`.
    pub fn into_cache_manager(
        self,
        policy: CachePolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<dyn CacheManager>, ConfigError> {
        match self {
            CacheConfig::None => Ok(Arc::new(NullCacheManager::default())),
            CacheConfig::Local => Ok(Arc::new(
                LocalCacheManager::with_clock(clock).with_policy(policy),
            )),
            CacheConfig::Moka(config) => config.into_cache_manager(policy, clock),
            CacheConfig::Redis(config) => config.into_cache_manager(policy, clock),
        }
    }
}

impl MokaConfig {
    #[cfg(feature = "moka")]
    fn into_cache_manager(
        self,
        policy: CachePolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<dyn CacheManager>, ConfigError> {
        use roost::cache::SharedCacheManager;
        use roost_moka::MokaStore;

        let mut builder = MokaStore::builder().max_entries(self.max_capacity);
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(ttl) = self.time_to_live {
            builder = builder.time_to_live(ttl);
        }
        let manager = SharedCacheManager::new(builder.build())
            .with_format(self.format)
            .with_clock(clock)
            .with_policy(policy);
        Ok(Arc::new(manager))
    }

    #[cfg(not(feature = "moka"))]
    fn into_cache_manager(
        self,
        _policy: CachePolicy,
        _clock: Arc<dyn Clock>,
    ) -> Result<Arc<dyn CacheManager>, ConfigError> {
        Err(ConfigError::StoreNotAvailable("Moka".to_owned()))
    }
}

impl RedisConfig {
    #[cfg(feature = "redis")]
    fn into_cache_manager(
        self,
        policy: CachePolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<dyn CacheManager>, ConfigError> {
        use roost::cache::SharedCacheManager;
        use roost_redis::RedisStore;

        let mut builder = RedisStore::builder().server(self.connection_string);
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(ttl) = self.ttl {
            builder = builder.ttl(ttl);
        }
        let store = builder.build().map_err(|e| ConfigError::Store {
            store: "Redis".to_owned(),
            reason: e.to_string(),
        })?;
        let manager = SharedCacheManager::new(store)
            .with_format(self.format)
            .with_clock(clock)
            .with_policy(policy);
        Ok(Arc::new(manager))
    }

    #[cfg(not(feature = "redis"))]
    fn into_cache_manager(
        self,
        _policy: CachePolicy,
        _clock: Arc<dyn Clock>,
    ) -> Result<Arc<dyn CacheManager>, ConfigError> {
        Err(ConfigError::StoreNotAvailable("Redis".to_owned()))
    }
}
