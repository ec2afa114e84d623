//! Ordered, case-insensitive, multi-valued header mapping.
//!
//! [`HeaderSet`] is the header representation shared by requests, responses,
//! cache entries and transports. Header names are matched case-insensitively
//! while values are stored exactly as given. Iteration follows the order in
//! which header names were first inserted.
//!
//! ```
//! use roost_core::HeaderSet;
//!
//! let mut headers = HeaderSet::new();
//! headers.append("Accept", "text/html");
//! headers.append("accept", "application/json");
//!
//! assert_eq!(headers.get("ACCEPT"), ["text/html", "application/json"]);
//! assert!(headers.get("Vary").is_empty());
//! ```

use std::fmt;

use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Values stored for one header name.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HeaderEntry {
    /// Name as it was spelled on first insertion.
    name: SmolStr,
    values: Vec<String>,
}

/// Ordered, case-insensitive, multi-valued header mapping.
///
/// Missing headers are never an error: [`HeaderSet::get`] returns an empty
/// slice.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct HeaderSet {
    entries: IndexMap<SmolStr, HeaderEntry>,
}

fn normalize(name: &str) -> SmolStr {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        SmolStr::from(name.to_ascii_lowercase())
    } else {
        SmolStr::new(name)
    }
}

impl HeaderSet {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the values of `name`, keeping existing values.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref();
        self.entries
            .entry(normalize(name))
            .or_insert_with(|| HeaderEntry {
                name: SmolStr::new(name),
                values: Vec::with_capacity(1),
            })
            .values
            .push(value.into());
    }

    /// Replaces every value of `name` with the single `value`.
    ///
    /// The header keeps its original position when it already exists.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref();
        let entry = self
            .entries
            .entry(normalize(name))
            .or_insert_with(|| HeaderEntry {
                name: SmolStr::new(name),
                values: Vec::with_capacity(1),
            });
        entry.values.clear();
        entry.values.push(value.into());
    }

    /// Returns all values of `name` in insertion order.
    pub fn get(&self, name: &str) -> &[String] {
        self.entries
            .get(&normalize(name))
            .map(|entry| entry.values.as_slice())
            .unwrap_or_default()
    }

    /// Returns the first value of `name`.
    pub fn get_one(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    /// Returns the comma-separated list elements of every `name` value,
    /// trimmed and with empty elements skipped.
    ///
    /// Suitable for list-valued headers such as `Vary`.
    pub fn get_list<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.get(name)
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|element| !element.is_empty())
    }

    /// Returns `true` if at least one value is stored for `name`.
    pub fn contains(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    /// Removes `name` and returns its values.
    pub fn remove(&mut self, name: &str) -> Vec<String> {
        self.entries
            .shift_remove(&normalize(name))
            .map(|entry| entry.values)
            .unwrap_or_default()
    }

    /// Merges `other` into `self`.
    ///
    /// For every header name present in `other`, its values replace the values
    /// held by `self`. Names only present in `self` are kept.
    pub fn merge(&mut self, other: &HeaderSet) {
        for (key, entry) in &other.entries {
            match self.entries.get_mut(key) {
                Some(existing) => existing.values.clone_from(&entry.values),
                None => {
                    self.entries.insert(key.clone(), entry.clone());
                }
            }
        }
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.values().flat_map(|entry| {
            entry
                .values
                .iter()
                .map(move |value| (entry.name.as_str(), value.as_str()))
        })
    }

    /// Iterates distinct header names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|entry| entry.name.as_str())
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no header is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts into an [`http::HeaderMap`], skipping names or values that are
    /// not valid on the wire.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in self.iter() {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                map.append(name, value);
            }
        }
        map
    }
}

impl PartialEq for HeaderSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(key, entry)| {
                other
                    .entries
                    .get(key)
                    .is_some_and(|theirs| theirs.values == entry.values)
            })
    }
}

impl Eq for HeaderSet {}

impl fmt::Debug for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl From<&HeaderMap> for HeaderSet {
    fn from(map: &HeaderMap) -> Self {
        let mut headers = HeaderSet::new();
        for (name, value) in map {
            // Non-UTF-8 values are kept lossily; cache semantics only need ASCII.
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        headers
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderSet::new();
        headers.extend(iter);
        headers
    }
}

impl<K, V> Extend<(K, V)> for HeaderSet
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}
