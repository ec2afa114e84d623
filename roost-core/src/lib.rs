#![warn(missing_docs)]
//! # roost-core
//!
//! Core types and capability traits for the roost caching HTTP client.
//!
//! This crate holds everything the cache and the request pipeline share
//! without depending on a concrete transport or storage medium:
//!
//! - **Messages** - [`HeaderSet`], [`Request`], [`Response`]
//! - **Capabilities** - [`Transport`] issues wire requests, [`AuthProvider`]
//!   supplies credentials, [`Clock`] supplies the current time
//! - **Cache semantics** - [`CacheControl`] directive parsing and the
//!   HTTP-date helpers in [`date`]
//! - **Configuration** - [`OptionsInterpreter`], the declarative option
//!   validator used by accessor and cache-manager constructors

pub mod auth;
pub mod cache_control;
pub mod clock;
pub mod date;
pub mod headers;
pub mod options;
pub mod request;
pub mod response;
pub mod transport;

pub use auth::{AuthProvider, Credentials, StaticAuthProvider};
pub use cache_control::CacheControl;
pub use clock::{Clock, SystemClock};
pub use headers::HeaderSet;
pub use options::{OptionSpec, Options, OptionsError, OptionsInterpreter, OptionsInterpreterBuilder};
pub use request::Request;
pub use response::Response;
pub use transport::{RawResponse, Transport, TransportError, TransportResult};

#[doc(hidden)]
pub use smol_str::SmolStr;

pub use http::{Method, StatusCode};
pub use url::Url;
