#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod accessor;
pub mod cache;
pub mod error;

pub use accessor::ConfigAccessor;
pub use cache::{CacheConfig, MokaConfig, RedisConfig};
pub use error::ConfigError;
