#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # roost-reqwest
//!
//! [`Transport`](roost_core::Transport) implementation on top of
//! [`reqwest`].
//!
//! The roost pipeline follows redirects, answers authentication challenges
//! and enforces timeouts itself, so the transport hands every exchange back
//! untouched: the wrapped client is built with redirects disabled.
//!
//! ```no_run
//! use roost::{HttpAccessor, cache::LocalCacheManager};
//! use roost_reqwest::ReqwestTransport;
//!
//! # async fn run() -> roost::Result<()> {
//! let transport = ReqwestTransport::try_new().expect("reqwest client");
//! let accessor = HttpAccessor::builder(transport)
//!     .cache_manager(LocalCacheManager::new())
//!     .build();
//! let response = accessor.get("http://example.com/", None).await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

mod transport;

pub use transport::ReqwestTransport;
