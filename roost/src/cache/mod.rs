//! HTTP cache: entries, per-URI collections and the managers that store
//! them.
//!
//! - [`CacheEntry`] - one stored response with its freshness metadata
//! - [`CacheEntryCollection`] - every `Vary` variant of one URI
//! - [`CacheManager`] - lookup, store, invalidation and revalidation
//!   merging on top of a storage medium
//! - [`LocalCacheManager`], [`SharedCacheManager`], [`NullCacheManager`]

mod collection;
mod entry;
pub mod freshness;
mod local;
mod manager;
mod null;
mod shared;

pub use collection::CacheEntryCollection;
pub use entry::CacheEntry;
pub use local::LocalCacheManager;
pub use manager::CacheManager;
pub use null::NullCacheManager;
pub use shared::SharedCacheManager;
