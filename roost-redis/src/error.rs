//! Error types for Redis store operations.
//!
//! Every [`Error`] converts into [`StoreError`]. Network-level failures
//! become [`StoreError::ConnectionError`], everything else
//! [`StoreError::InternalError`].

use redis::RedisError;
use roost_store::StoreError;

/// Error type for Redis store operations.
///
/// Appears when [`RedisStoreBuilder::build`](crate::RedisStoreBuilder::build)
/// gets an invalid connection URL, and, wrapped in a [`StoreError`], when
/// a store call fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    #[error("Redis store error: {0}")]
    Redis(#[from] RedisError),
}

impl Error {
    /// `true` when the failure is about reaching Redis rather than about the
    /// command itself.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Error::Redis(error) => {
                error.is_io_error()
                    || error.is_connection_refusal()
                    || error.is_connection_dropped()
                    || error.is_timeout()
            }
        }
    }
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        if error.is_connection_error() {
            Self::ConnectionError(Box::new(error))
        } else {
            Self::InternalError(Box::new(error))
        }
    }
}
