use sha2::{Digest, Sha256};

/// Prefix of every key written by roost. Bumped together with the envelope
/// version when the stored layout changes incompatibly.
pub const KEY_PREFIX: &str = "roost:v1:";

/// Derives the store key of a resource URI.
///
/// The key is stable across processes and releases: the lowercase hex SHA-256
/// digest of the URI string, prefixed with [`KEY_PREFIX`].
///
/// ```
/// use roost_store::store_key;
///
/// let key = store_key("http://example.com/");
/// assert!(key.starts_with("roost:v1:"));
/// assert_eq!(key, store_key("http://example.com/"));
/// assert_ne!(key, store_key("http://example.com/other"));
/// ```
pub fn store_key(uri: &str) -> String {
    let digest = Sha256::digest(uri.as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(digest))
}
