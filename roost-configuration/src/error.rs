//! Configuration errors.

use thiserror::Error;

/// Failure to read a configuration document or to build what it describes.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid YAML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// The configured store was compiled out; enable its cargo feature.
    #[error("store {0} is not available, enable the corresponding feature")]
    StoreNotAvailable(String),

    /// The store rejected its settings.
    #[error("{store} store could not be created: {reason}")]
    Store {
        /// Store kind.
        store: String,
        /// Underlying error message.
        reason: String,
    },
}
