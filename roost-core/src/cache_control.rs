//! `Cache-Control` directive parsing.
//!
//! Only the directives that influence a private (client-side) cache are given
//! typed accessors; every other directive is still kept and reachable through
//! [`CacheControl::directive`].

use indexmap::IndexMap;

use crate::HeaderSet;

/// Value used for delta-seconds that overflow `u32` (RFC 9111 §1.2.2).
pub const DELTA_SECONDS_OVERFLOW_VALUE: u32 = 2_147_483_648;

/// Parsed `Cache-Control` directives, in header order, keyed by lowercase
/// directive name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    directives: IndexMap<String, Option<String>>,
}

impl CacheControl {
    /// Parses every `Cache-Control` value in `headers`.
    ///
    /// Returns `None` when the header is absent.
    pub fn from_headers(headers: &HeaderSet) -> Option<Self> {
        let values = headers.get("cache-control");
        if values.is_empty() {
            return None;
        }
        Some(Self::parse(values.iter().map(String::as_str)))
    }

    /// Parses a sequence of header values.
    ///
    /// Later occurrences of a directive overwrite earlier ones.
    pub fn parse<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut directives = IndexMap::new();
        for value in values {
            for directive in split_directives(value) {
                let (name, argument) = match directive.split_once('=') {
                    Some((name, argument)) => (name.trim(), Some(unquote(argument.trim()))),
                    None => (directive, None),
                };
                if name.is_empty() {
                    continue;
                }
                directives.insert(name.to_ascii_lowercase(), argument.map(str::to_owned));
            }
        }
        CacheControl { directives }
    }

    /// Returns `true` if `name` is present, with or without an argument.
    pub fn has(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    /// Returns the argument of `name`; `Some(None)` for a bare directive.
    pub fn directive(&self, name: &str) -> Option<Option<&str>> {
        self.directives.get(name).map(Option::as_deref)
    }

    /// `no-store`: the response must not be stored at all.
    pub fn no_store(&self) -> bool {
        self.has("no-store")
    }

    /// `no-cache`: a stored response must be revalidated before every reuse.
    pub fn no_cache(&self) -> bool {
        self.has("no-cache")
    }

    /// `must-revalidate`: once stale, the response must not be reused
    /// without successful revalidation.
    pub fn must_revalidate(&self) -> bool {
        self.has("must-revalidate")
    }

    /// `public`
    pub fn public(&self) -> bool {
        self.has("public")
    }

    /// `private`
    pub fn private(&self) -> bool {
        self.has("private")
    }

    /// `max-age` in seconds.
    ///
    /// An unparseable argument yields `Some(0)` so that the response is
    /// treated as already stale.
    pub fn max_age(&self) -> Option<u32> {
        self.delta_seconds("max-age")
    }

    /// `s-maxage` in seconds.
    pub fn s_maxage(&self) -> Option<u32> {
        self.delta_seconds("s-maxage")
    }

    fn delta_seconds(&self, name: &str) -> Option<u32> {
        let argument = self.directives.get(name)?;
        Some(
            argument
                .as_deref()
                .map(parse_delta_seconds)
                .unwrap_or_default(),
        )
    }

    /// Returns `true` if a response to a request carrying `Authorization` may
    /// still be stored (RFC 9111 §3.5).
    pub fn allows_authorized_caching(&self) -> bool {
        self.public() || self.must_revalidate() || self.s_maxage().is_some()
    }
}

fn parse_delta_seconds(argument: &str) -> u32 {
    match argument.parse::<u64>() {
        Ok(seconds) => u32::try_from(seconds).unwrap_or(DELTA_SECONDS_OVERFLOW_VALUE),
        Err(error) if *error.kind() == std::num::IntErrorKind::PosOverflow => {
            DELTA_SECONDS_OVERFLOW_VALUE
        }
        Err(_) => 0,
    }
}

fn unquote(argument: &str) -> &str {
    argument
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(argument)
}

/// Splits on `,` outside quoted strings and trims optional whitespace.
fn split_directives(value: &str) -> impl Iterator<Item = &str> {
    let mut directives = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;
    for (index, byte) in value.bytes().enumerate() {
        match byte {
            _ if escaped => escaped = false,
            b'\\' if in_quotes => escaped = true,
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                directives.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    directives.push(&value[start..]);
    directives
        .into_iter()
        .map(|directive| directive.trim_matches([' ', '\t']))
        .filter(|directive| !directive.is_empty())
}
