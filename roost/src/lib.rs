#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # roost
//!
//! A caching HTTP client. Every request issued through an [`HttpAccessor`]
//! runs a small state machine that decides whether to serve a fresh cached
//! response, revalidate a stale one with a conditional request, or fetch
//! from the origin, following redirects and answering authentication
//! challenges along the way.
//!
//! ```no_run
//! use roost::{HttpAccessor, cache::LocalCacheManager};
//! # async fn run(transport: impl roost::Transport + 'static) -> roost::Result<()> {
//! let accessor = HttpAccessor::builder(transport)
//!     .cache_manager(LocalCacheManager::new())
//!     .build();
//!
//! let first = accessor.get("http://example.com/", None).await?;
//! let second = accessor.get("http://example.com/", None).await?;
//! assert_eq!(first, second);
//! # Ok(())
//! # }
//! ```

mod accessor;

/// HTTP cache entries, collections and cache managers.
pub mod cache;

/// Accessor, pipeline and cache policy configuration.
pub mod config;

mod error;

/// Request pipeline state machine.
///
/// The pipeline moves through `CacheCheck`, `Fetching`, `Revalidating` and
/// `Redirecting` until it reaches `Done`. Each state runs inside its own
/// `pipeline.<State>` tracing span.
pub mod fsm;

/// Metrics collection for cache observability.
///
/// When the `metrics` feature is enabled, this module provides counters for
/// hits, misses, stale lookups, stores and invalidations, and a histogram of
/// transport call timings.
pub mod metrics;

mod resource;

pub use accessor::{HttpAccessor, HttpAccessorBuilder};
pub use cache::{CacheEntry, CacheEntryCollection, CacheManager};
pub use config::{AccessorConfig, CacheMode, CachePolicy};
pub use error::{Error, Result};
pub use resource::Resource;

pub use roost_core::{
    AuthProvider, Clock, Credentials, HeaderSet, Method, Options, RawResponse, Request, Response,
    StaticAuthProvider, StatusCode, SystemClock, Transport, TransportError, TransportResult, Url,
};
pub use roost_store::{Format, Store};
