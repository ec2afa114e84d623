//! Builder for configuring [`MokaStore`].

use std::time::Duration;

use bytes::Bytes;
use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;

use crate::store::MokaStore;

/// Fixed per-entry overhead assumed by the byte weigher.
const ENTRY_OVERHEAD: usize = 64;

/// Marker type: capacity has not been configured yet.
///
/// Call [`max_entries`](MokaStoreBuilder::max_entries) or
/// [`max_bytes`](MokaStoreBuilder::max_bytes) before `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: the store holds at most `n` keys.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: the store holds at most `n` bytes (approximate).
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for [`MokaStore`].
///
/// The capacity methods use the typestate pattern: `build()` exists only
/// once a capacity has been set, and only one kind of capacity can be set.
///
/// ```
/// use std::time::Duration;
/// use roost_moka::MokaStore;
///
/// let store = MokaStore::builder()
///     .name("pages")
///     .max_bytes(64 * 1024 * 1024)
///     .time_to_idle(Duration::from_secs(3600))
///     .build();
/// ```
#[derive(Debug)]
pub struct MokaStoreBuilder<Cap> {
    capacity: Cap,
    name: String,
    eviction_policy: Option<EvictionPolicy>,
    time_to_live: Option<Duration>,
    time_to_idle: Option<Duration>,
}

impl MokaStoreBuilder<NoCapacity> {
    /// Creates a builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            name: "moka".to_owned(),
            eviction_policy: None,
            time_to_live: None,
            time_to_idle: None,
        }
    }

    /// Limits the store to `capacity` keys.
    pub fn max_entries(self, capacity: u64) -> MokaStoreBuilder<EntryCapacity> {
        self.with_capacity(EntryCapacity(capacity))
    }

    /// Limits the store to approximately `bytes` of keys and values.
    pub fn max_bytes(self, bytes: u64) -> MokaStoreBuilder<ByteCapacity> {
        self.with_capacity(ByteCapacity(bytes))
    }

    fn with_capacity<Cap>(self, capacity: Cap) -> MokaStoreBuilder<Cap> {
        MokaStoreBuilder {
            capacity,
            name: self.name,
            eviction_policy: self.eviction_policy,
            time_to_live: self.time_to_live,
            time_to_idle: self.time_to_idle,
        }
    }
}

impl Default for MokaStoreBuilder<NoCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cap> MokaStoreBuilder<Cap> {
    /// Name reported in logs and metrics. Default: `"moka"`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Eviction policy.
    ///
    /// Defaults to TinyLFU for entry capacity and to LRU for byte capacity,
    /// where TinyLFU admission could reject a large value even though
    /// evicting would make room.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Drops keys this long after they were written.
    ///
    /// HTTP freshness is decided by the cache manager, not by the store, and
    /// stale entries are still useful for revalidation. Set this well above
    /// the typical `max-age` of the cached resources.
    pub fn time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    /// Drops keys this long after they were last read or written.
    pub fn time_to_idle(mut self, tti: Duration) -> Self {
        self.time_to_idle = Some(tti);
        self
    }

    fn finish(
        self,
        builder: CacheBuilder<String, Bytes, Cache<String, Bytes>>,
        default_policy: EvictionPolicy,
    ) -> MokaStore {
        let mut builder = builder.eviction_policy(self.eviction_policy.unwrap_or(default_policy));
        if let Some(ttl) = self.time_to_live {
            builder = builder.time_to_live(ttl);
        }
        if let Some(tti) = self.time_to_idle {
            builder = builder.time_to_idle(tti);
        }
        MokaStore {
            cache: builder.name(&self.name).build(),
            name: self.name,
        }
    }
}

impl MokaStoreBuilder<EntryCapacity> {
    /// Builds a store bounded by key count.
    pub fn build(self) -> MokaStore {
        let builder = Cache::builder().max_capacity(self.capacity.0);
        self.finish(builder, EvictionPolicy::tiny_lfu())
    }
}

impl MokaStoreBuilder<ByteCapacity> {
    /// Builds a store bounded by approximate byte size.
    pub fn build(self) -> MokaStore {
        let builder = Cache::builder()
            .max_capacity(self.capacity.0)
            .weigher(byte_weigher);
        self.finish(builder, EvictionPolicy::lru())
    }
}

#[allow(clippy::ptr_arg)]
fn byte_weigher(key: &String, value: &Bytes) -> u32 {
    (key.len() + value.len() + ENTRY_OVERHEAD).min(u32::MAX as usize) as u32
}
