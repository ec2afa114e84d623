use std::time::Duration;

use roost_core::{Method, OptionsError, TransportError};
use thiserror::Error;

/// Errors surfaced by accessors and resources.
///
/// Cache failures never appear here: a broken or unreachable store degrades
/// to a cache miss.
#[derive(Debug, Error)]
pub enum Error {
    /// The origin could not be reached.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The transport did not answer within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The redirect chain exceeded the configured limit.
    #[error("too many redirects (limit is {0})")]
    TooManyRedirects(usize),

    /// Options outside the declared set were supplied.
    #[error("Unrecognized options: {}", .0.join(", "))]
    UnrecognizedOption(Vec<String>),

    /// The origin sent something that is not a usable HTTP response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A URI could not be parsed.
    #[error("invalid uri {uri:?}: {source}")]
    InvalidUri {
        /// The rejected input.
        uri: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// Only `GET` requests can be stubbed.
    #[error("only GET requests can be stubbed, got {0}")]
    InvalidStub(Method),

    /// Interpreted options could not be converted into typed configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Connection(source) => Error::Connection(source),
            TransportError::Timeout(after) => Error::Timeout(after),
        }
    }
}

impl From<OptionsError> for Error {
    fn from(error: OptionsError) -> Self {
        match error {
            OptionsError::Unrecognized(names) => Error::UnrecognizedOption(names),
        }
    }
}

/// Result alias for accessor operations.
pub type Result<T> = std::result::Result<T, Error>;
