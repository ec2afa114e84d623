//! Storage contract for the roost HTTP cache.
//!
//! A [`Store`] is a plain async key/value medium. It knows nothing about HTTP:
//! the shared cache manager encodes each resource's entry collection with a
//! [`format::Format`], wraps it in a versioned envelope and hands the bytes to
//! the store under a key produced by [`store_key`].
//!
//! If you want to plug in your own storage, implement [`Store`].
mod error;
pub mod format;
mod key;
mod store;

pub use error::{DeleteStatus, StoreError};
pub use format::{Format, FormatError};
pub use key::{KEY_PREFIX, store_key};
pub use store::{Store, StoreResult};
