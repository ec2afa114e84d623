//! Declarative option validation.
//!
//! An [`OptionsInterpreter`] knows the set of option names a constructor
//! accepts, with an optional default and an optional transform for each.
//! [`OptionsInterpreter::interpret`] rejects unknown names (all of them at
//! once), fills in defaults and applies transforms.
//!
//! ```
//! use roost_core::options::{OptionSpec, OptionsInterpreter};
//! use serde_json::{Value, json};
//!
//! let interpreter = OptionsInterpreter::builder()
//!     .option("timeout", OptionSpec::new().default_value(json!(30)))
//!     .option(
//!         "name",
//!         OptionSpec::new().transform(|value| match value {
//!             Value::String(name) => Value::String(name.to_uppercase()),
//!             other => other,
//!         }),
//!     )
//!     .build();
//!
//! let options = json!({ "name": "roost" });
//! let interpreted = interpreter.interpret(options.as_object().unwrap()).unwrap();
//! assert_eq!(interpreted["timeout"], json!(30));
//! assert_eq!(interpreted["name"], json!("ROOST"));
//! ```

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde_json::{Map, Value};
use thiserror::Error;

/// Option names mapped to values.
pub type Options = Map<String, Value>;

type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Errors produced by [`OptionsInterpreter::interpret`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// The input contained names outside the declared set. Sorted.
    #[error("Unrecognized options: {}", .0.join(", "))]
    Unrecognized(Vec<String>),
}

/// Declaration of one accepted option.
#[derive(Clone, Default)]
pub struct OptionSpec {
    default: Option<Value>,
    transform: Option<Transform>,
}

impl OptionSpec {
    /// An option without default or transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value used when the option is absent or null.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Function applied to a supplied, non-null value.
    #[must_use]
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("default", &self.default)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Validates and normalizes option maps.
#[derive(Debug, Clone, Default)]
pub struct OptionsInterpreter {
    specs: BTreeMap<String, OptionSpec>,
}

impl OptionsInterpreter {
    /// Starts declaring options.
    pub fn builder() -> OptionsInterpreterBuilder {
        OptionsInterpreterBuilder::default()
    }

    /// Declared option names, sorted.
    pub fn supported_options(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Validates `options` and returns the normalized map.
    ///
    /// Absent or null options take their default, or are omitted when they
    /// have none. Supplied options pass through their transform.
    pub fn interpret(&self, options: &Options) -> Result<Options, OptionsError> {
        let mut unknown: Vec<String> = options
            .keys()
            .filter(|name| !self.specs.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(OptionsError::Unrecognized(unknown));
        }

        let mut interpreted = Options::new();
        for (name, spec) in &self.specs {
            let value = match options.get(name) {
                None | Some(Value::Null) => spec.default.clone(),
                Some(value) => Some(match &spec.transform {
                    Some(transform) => transform(value.clone()),
                    None => value.clone(),
                }),
            };
            if let Some(value) = value {
                interpreted.insert(name.clone(), value);
            }
        }
        Ok(interpreted)
    }
}

/// Builder for [`OptionsInterpreter`].
#[derive(Debug, Default)]
pub struct OptionsInterpreterBuilder {
    specs: BTreeMap<String, OptionSpec>,
}

impl OptionsInterpreterBuilder {
    /// Declares an option. Redeclaring a name replaces the earlier spec.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, spec: OptionSpec) -> Self {
        self.specs.insert(name.into(), spec);
        self
    }

    /// Declares options that have neither default nor transform.
    #[must_use]
    pub fn options<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.specs.insert(name.into(), OptionSpec::new());
        }
        self
    }

    /// Finishes the declaration.
    pub fn build(self) -> OptionsInterpreter {
        OptionsInterpreter { specs: self.specs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn options(value: Value) -> Options {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn interpreter() -> OptionsInterpreter {
        OptionsInterpreter::builder()
            .options(["foo"])
            .option("limit", OptionSpec::new().default_value(json!(10)))
            .option(
                "doubled",
                OptionSpec::new().transform(|value| json!(value.as_i64().unwrap_or(0) * 2)),
            )
            .build()
    }

    #[test]
    fn lists_every_unrecognized_option() {
        let error = interpreter()
            .interpret(&options(json!({ "foo": 1, "baz": 2, "bar": 3 })))
            .unwrap_err();
        assert_eq!(
            error,
            OptionsError::Unrecognized(vec!["bar".to_owned(), "baz".to_owned()])
        );
        assert_eq!(error.to_string(), "Unrecognized options: bar, baz");
    }

    #[test]
    fn default_fills_absent_option() {
        let interpreted = interpreter().interpret(&Options::new()).unwrap();
        assert_eq!(interpreted.get("limit"), Some(&json!(10)));
        assert!(!interpreted.contains_key("foo"));
        assert!(!interpreted.contains_key("doubled"));
    }

    #[test]
    fn null_takes_default_not_null() {
        let interpreted = interpreter()
            .interpret(&options(json!({ "limit": null, "foo": null })))
            .unwrap();
        assert_eq!(interpreted.get("limit"), Some(&json!(10)));
        assert!(!interpreted.contains_key("foo"));
    }

    #[test]
    fn transform_applies_to_supplied_values() {
        let interpreted = interpreter()
            .interpret(&options(json!({ "doubled": 21, "foo": "x", "limit": 3 })))
            .unwrap();
        assert_eq!(
            interpreted,
            options(json!({ "doubled": 42, "foo": "x", "limit": 3 }))
        );
    }

    #[test]
    fn supported_options_are_sorted() {
        let interp = interpreter();
        let names: Vec<_> = interp.supported_options().collect();
        assert_eq!(names, ["doubled", "foo", "limit"]);
    }
}
