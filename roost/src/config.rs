//! Accessor and cache-manager configuration.
//!
//! Configuration can be built in code, deserialized (durations use
//! humantime notation such as `"30s"` or `"500ms"`) or interpreted from a
//! loose option map with [`AccessorConfig::from_options`].

use std::time::Duration;

use roost_core::{OptionSpec, Options, OptionsInterpreter};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::Error;

/// Default transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default redirect limit.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Cache behavior knobs shared by every cache manager.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Default)]
pub struct CachePolicy {
    /// Treat every stored entry as stale, so each request revalidates.
    #[serde(default)]
    pub force_revalidate: bool,
    /// Upper bound for a single store call (e.g., "200ms"). Expiry is a miss.
    #[serde(default, with = "humantime_serde")]
    pub store_timeout: Option<Duration>,
}

impl CachePolicy {
    /// Builds a policy from `force_revalidate` / `store_timeout` options.
    pub fn from_options(options: &Options) -> Result<Self, Error> {
        let interpreter = OptionsInterpreter::builder()
            .option(
                "force_revalidate",
                OptionSpec::new().default_value(Value::Bool(false)),
            )
            .options(["store_timeout"])
            .build();
        typed(interpreter.interpret(options)?)
    }
}

/// Which cache manager [`HttpAccessor::from_options`](crate::HttpAccessor::from_options)
/// installs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// No caching at all.
    #[default]
    None,
    /// Process-local in-memory cache.
    Local,
}

/// Request pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct AccessorConfig {
    /// Timeout of one transport call (e.g., "30s").
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// Redirects followed before failing with `TooManyRedirects`.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// `User-Agent` added to requests that do not set one.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: None,
        }
    }
}

/// Interpreted form of the accessor option map.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccessorOptions {
    #[serde(flatten)]
    pub config: AccessorConfig,
    pub cache: CacheMode,
    #[serde(flatten)]
    pub policy: CachePolicy,
}

impl AccessorConfig {
    /// Names accepted by [`AccessorConfig::from_options`] and
    /// [`HttpAccessor::from_options`](crate::HttpAccessor::from_options).
    pub fn interpreter() -> OptionsInterpreter {
        OptionsInterpreter::builder()
            .option("timeout", OptionSpec::new().default_value(json!("30s")))
            .option(
                "max_redirects",
                OptionSpec::new().default_value(json!(DEFAULT_MAX_REDIRECTS)),
            )
            .options(["user_agent", "store_timeout"])
            .option(
                "cache",
                OptionSpec::new()
                    .default_value(json!("none"))
                    .transform(|value| match value {
                        Value::String(mode) => Value::String(mode.to_ascii_lowercase()),
                        other => other,
                    }),
            )
            .option("force_revalidate", OptionSpec::new().default_value(json!(false)))
            .build()
    }

    /// Builds the pipeline configuration from an option map.
    ///
    /// Unknown options fail with [`Error::UnrecognizedOption`] listing all of
    /// them; values of the wrong shape fail with [`Error::Config`].
    pub fn from_options(options: &Options) -> Result<Self, Error> {
        Ok(AccessorOptions::from_options(options)?.config)
    }
}

impl AccessorOptions {
    pub(crate) fn from_options(options: &Options) -> Result<Self, Error> {
        typed(AccessorConfig::interpreter().interpret(options)?)
    }
}

fn typed<T: DeserializeOwned>(options: Options) -> Result<T, Error> {
    serde_json::from_value(Value::Object(options)).map_err(|e| Error::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options(value: Value) -> Options {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn defaults_from_empty_options() {
        let parsed = AccessorOptions::from_options(&Options::new()).unwrap();
        assert_eq!(parsed.config, AccessorConfig::default());
        assert_eq!(parsed.cache, CacheMode::None);
        assert_eq!(parsed.policy, CachePolicy::default());
    }

    #[test]
    fn explicit_values_and_nulls() {
        let parsed = AccessorOptions::from_options(&options(json!({
            "timeout": "250ms",
            "max_redirects": null,
            "user_agent": "roost/0.1",
            "cache": "LOCAL",
            "store_timeout": "1s",
        })))
        .unwrap();
        assert_eq!(parsed.config.timeout, Duration::from_millis(250));
        assert_eq!(parsed.config.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert_eq!(parsed.config.user_agent.as_deref(), Some("roost/0.1"));
        assert_eq!(parsed.cache, CacheMode::Local);
        assert_eq!(parsed.policy.store_timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn unknown_options_are_all_reported() {
        let error = AccessorConfig::from_options(&options(json!({ "foo": 1, "bar": 2 })))
            .unwrap_err();
        assert!(matches!(
            &error,
            Error::UnrecognizedOption(names) if names == &["bar", "foo"]
        ));
        assert_eq!(error.to_string(), "Unrecognized options: bar, foo");
    }

    #[test]
    fn malformed_values_are_config_errors() {
        let error = AccessorConfig::from_options(&options(json!({ "timeout": "soon" })))
            .unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn cache_policy_from_options() {
        let policy = CachePolicy::from_options(&options(json!({ "force_revalidate": true })))
            .unwrap();
        assert!(policy.force_revalidate);
        assert_eq!(policy.store_timeout, None);
    }
}
