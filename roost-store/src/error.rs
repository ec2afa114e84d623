//! Error types for store operations.

use thiserror::Error;

use crate::format::FormatError;

/// Error type for store operations.
///
/// Callers in the cache layer never surface these to users: any failure
/// degrades to a cache miss.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Internal store error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote stores (e.g., Redis).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// Encoding or decoding of a stored value failed.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
