//! Authentication capability.
//!
//! When the origin answers `401 Unauthorized`, the pipeline asks an
//! [`AuthProvider`] for credentials matching the target URI and the realm
//! announced in `WWW-Authenticate`, then retries once with HTTP Basic
//! credentials.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

/// Username and password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for an `Authorization` header using the Basic scheme.
    pub fn basic_authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Supplies credentials for a URI and optional realm.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns credentials for `uri` in `realm`, if known.
    async fn credentials_for(&self, uri: &Url, realm: Option<&str>) -> Option<Credentials>;
}

#[async_trait]
impl AuthProvider for Arc<dyn AuthProvider> {
    async fn credentials_for(&self, uri: &Url, realm: Option<&str>) -> Option<Credentials> {
        (**self).credentials_for(uri, realm).await
    }
}

/// Extracts the `realm` parameter of a `WWW-Authenticate` challenge.
///
/// ```
/// use roost_core::auth::parse_realm;
///
/// assert_eq!(parse_realm(r#"Basic realm="staff""#), Some("staff".to_owned()));
/// assert_eq!(parse_realm("Bearer"), None);
/// ```
pub fn parse_realm(challenge: &str) -> Option<String> {
    let lower = challenge.to_ascii_lowercase();
    let start = lower.find("realm=")? + "realm=".len();
    let rest = &challenge[start..];
    let realm = match rest.strip_prefix('"') {
        Some(quoted) => &quoted[..quoted.find('"')?],
        None => rest.split([',', ' ']).next().unwrap_or_default(),
    };
    Some(realm.to_owned())
}

#[derive(Debug, Clone)]
struct Registration {
    host: String,
    realm: Option<String>,
    credentials: Credentials,
}

/// In-memory [`AuthProvider`] keyed by host and realm.
///
/// A registration without a realm answers for every realm of its host.
/// Registrations are consulted in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    registrations: Vec<Registration>,
}

impl StaticAuthProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers credentials for `host`, optionally limited to `realm`.
    #[must_use]
    pub fn with_credentials(
        mut self,
        host: impl Into<String>,
        realm: Option<&str>,
        credentials: Credentials,
    ) -> Self {
        self.registrations.push(Registration {
            host: host.into().to_ascii_lowercase(),
            realm: realm.map(str::to_owned),
            credentials,
        });
        self
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn credentials_for(&self, uri: &Url, realm: Option<&str>) -> Option<Credentials> {
        let host = uri.host_str()?.to_ascii_lowercase();
        self.registrations
            .iter()
            .find(|registration| {
                registration.host == host
                    && match (&registration.realm, realm) {
                        (None, _) => true,
                        (Some(expected), Some(actual)) => expected == actual,
                        (Some(_), None) => false,
                    }
            })
            .map(|registration| registration.credentials.clone())
    }
}
