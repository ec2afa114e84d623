use std::time::Duration;

use pretty_assertions::assert_eq;
use roost::{CachePolicy, Method, RawResponse};
use roost_configuration::{CacheConfig, ConfigAccessor, ConfigError, MokaConfig, RedisConfig};
use roost_store::Format;
use roost_test::MockTransport;

#[test]
fn full_document() {
    let yaml = r#"
timeout: 10s
max_redirects: 5
user_agent: my-service/1.0
cache:
  type: Moka
  max_capacity: 10000
  time_to_live: 1h
  format: json
policy:
  force_revalidate: true
  store_timeout: 200ms
"#;

    let config = ConfigAccessor::from_yaml(yaml).expect("failed to deserialize");

    assert_eq!(config.timeout, Duration::from_secs(10));
    assert_eq!(config.max_redirects, 5);
    assert_eq!(config.user_agent.as_deref(), Some("my-service/1.0"));
    assert_eq!(
        config.cache,
        CacheConfig::Moka(MokaConfig {
            max_capacity: 10000,
            time_to_live: Some(Duration::from_secs(3600)),
            name: None,
            format: Format::Json,
        })
    );
    assert_eq!(
        config.policy,
        CachePolicy {
            force_revalidate: true,
            store_timeout: Some(Duration::from_millis(200)),
        }
    );
}

#[test]
fn empty_document_uses_defaults() {
    let config = ConfigAccessor::from_yaml("{}").unwrap();

    assert_eq!(config, ConfigAccessor::default());
    assert_eq!(config.accessor_config(), roost::AccessorConfig::default());
    assert_eq!(config.cache, CacheConfig::None);
}

#[test]
fn redis_section() {
    let yaml = r#"
cache:
  type: Redis
  connection_string: "redis://localhost:6379"
  ttl: 1d
"#;

    let config = ConfigAccessor::from_yaml(yaml).unwrap();

    match config.cache {
        CacheConfig::Redis(RedisConfig {
            connection_string,
            ttl,
            format,
            ..
        }) => {
            assert_eq!(connection_string, "redis://localhost:6379");
            assert_eq!(ttl, Some(Duration::from_secs(86400)));
            assert_eq!(format, Format::Bincode);
        }
        other => panic!("expected Redis cache, got {other:?}"),
    }
}

#[test]
fn unknown_keys_are_rejected() {
    let error = ConfigAccessor::from_yaml("retries: 3\n").unwrap_err();
    assert!(matches!(error, ConfigError::Parse(_)));
}

#[test]
fn malformed_duration_is_rejected() {
    let error = ConfigAccessor::from_yaml("timeout: soon\n").unwrap_err();
    assert!(matches!(error, ConfigError::Parse(_)));
}

#[tokio::test]
async fn local_cache_accessor() {
    let uri = "http://example.com/configured";
    let transport = MockTransport::new();
    transport.on(
        Method::GET,
        uri,
        RawResponse::new(200, "configured").with_header("Cache-Control", "max-age=60"),
    );
    let yaml = r#"
user_agent: configured/1.0
cache:
  type: Local
"#;

    let accessor = ConfigAccessor::from_yaml(yaml)
        .unwrap()
        .into_accessor(transport.clone())
        .unwrap();

    accessor.get(uri, None).await.unwrap();
    let cached = accessor.get(uri, None).await.unwrap();

    assert!(!cached.is_authoritative());
    assert_eq!(transport.request_count(), 1);
    assert_eq!(
        transport.last_request().unwrap().headers.get_one("user-agent"),
        Some("configured/1.0")
    );
}

#[cfg(feature = "moka")]
#[tokio::test]
async fn moka_cache_accessor() {
    let uri = "http://example.com/moka";
    let transport = MockTransport::new();
    transport.on(
        Method::GET,
        uri,
        RawResponse::new(200, "moka").with_header("Cache-Control", "max-age=60"),
    );
    let yaml = r#"
cache:
  type: Moka
  max_capacity: 100
"#;

    let accessor = ConfigAccessor::from_yaml(yaml)
        .unwrap()
        .into_accessor(transport.clone())
        .unwrap();

    accessor.get(uri, None).await.unwrap();
    accessor.get(uri, None).await.unwrap();
    assert_eq!(transport.request_count(), 1);
}

#[cfg(not(feature = "moka"))]
#[test]
fn moka_without_feature_is_unavailable() {
    let config = ConfigAccessor::from_yaml("cache:\n  type: Moka\n  max_capacity: 10\n").unwrap();
    let error = config.cache_manager().unwrap_err();
    assert!(matches!(error, ConfigError::StoreNotAvailable(name) if name == "Moka"));
}

#[cfg(not(feature = "redis"))]
#[test]
fn redis_without_feature_is_unavailable() {
    let config = ConfigAccessor::from_yaml(
        "cache:\n  type: Redis\n  connection_string: redis://localhost/\n",
    )
    .unwrap();
    assert!(matches!(
        config.cache_manager().unwrap_err(),
        ConfigError::StoreNotAvailable(_)
    ));
}
