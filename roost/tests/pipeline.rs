mod common;

use std::time::Duration;

use common::{Harness, URI, get, ok, status, uri};
use pretty_assertions::assert_eq;
use roost::{
    AccessorConfig, Credentials, Error, HeaderSet, HttpAccessor, Method, Options, RawResponse,
    StaticAuthProvider, cache::CacheManager,
};
use roost_test::{MockTransport, Reply, SpanCollector};
use serde_json::json;

fn options(value: serde_json::Value) -> Options {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}

fn with_auth(transport: &MockTransport) -> HttpAccessor {
    HttpAccessor::builder(transport.clone())
        .auth_provider(StaticAuthProvider::new().with_credentials(
            "example.com",
            Some("staff"),
            Credentials::new("Aladdin", "open sesame"),
        ))
        .build()
}

#[tokio::test]
async fn challenge_is_answered_once_with_basic_credentials() {
    let transport = MockTransport::new();
    transport
        .on(
            Method::GET,
            URI,
            status(401, &[("WWW-Authenticate", "Basic realm=\"staff\"")]),
        )
        .on(Method::GET, URI, ok("welcome", &[]));

    let response = with_auth(&transport).get(URI, None).await.unwrap();

    assert_eq!(response.body().as_ref(), b"welcome");
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].headers.contains("authorization"));
    assert_eq!(
        requests[1].headers.get_one("authorization"),
        Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
    );
}

#[tokio::test]
async fn second_challenge_is_returned() {
    let transport = MockTransport::new();
    transport.on(
        Method::GET,
        URI,
        status(401, &[("WWW-Authenticate", "Basic realm=\"staff\"")]),
    );

    let response = with_auth(&transport).get(URI, None).await.unwrap();

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn challenge_without_matching_credentials_is_returned() {
    let transport = MockTransport::new();
    transport.on(
        Method::GET,
        URI,
        status(401, &[("WWW-Authenticate", "Basic realm=\"other\"")]),
    );

    let response = with_auth(&transport).get(URI, None).await.unwrap();

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn slow_transport_times_out() {
    let transport = MockTransport::new();
    transport.on(
        Method::GET,
        URI,
        Reply::Delay(Duration::from_millis(500), ok("late", &[])),
    );
    let accessor = HttpAccessor::builder(transport)
        .config(AccessorConfig {
            timeout: Duration::from_millis(20),
            ..AccessorConfig::default()
        })
        .build();

    let error = accessor.get(URI, None).await.unwrap_err();

    assert!(matches!(error, Error::Timeout(after) if after == Duration::from_millis(20)));
}

#[tokio::test]
async fn transport_failure_is_a_connection_error() {
    let transport = MockTransport::new();
    transport.on(Method::GET, URI, Reply::Fail("connection refused".to_owned()));

    let error = HttpAccessor::new(transport)
        .get(URI, None)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Connection(_)));
    assert!(error.to_string().contains("connection refused"));
}

#[tokio::test]
async fn out_of_range_status_is_invalid() {
    let transport = MockTransport::new();
    transport.on(Method::GET, URI, RawResponse::new(1000, ""));

    let error = HttpAccessor::new(transport)
        .get(URI, None)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::InvalidResponse(_)));
}

#[tokio::test]
async fn unsafe_methods_invalidate_the_uri() {
    let harness = Harness::new();
    harness
        .transport
        .on(Method::GET, URI, ok("v1", &[("Cache-Control", "max-age=600")]))
        .on(Method::GET, URI, ok("v2", &[("Cache-Control", "max-age=600")]))
        .on(Method::PUT, URI, status(204, &[]));

    harness.accessor.get(URI, None).await.unwrap();
    harness.accessor.put(URI, "v2", None).await.unwrap();
    assert!(harness.cache.lookup_entry(&get(URI)).await.is_none());

    let refreshed = harness.accessor.get(URI, None).await.unwrap();
    assert_eq!(refreshed.body().as_ref(), b"v2");
    assert_eq!(harness.transport.request_count(), 3);
}

#[tokio::test]
async fn failed_post_still_invalidates() {
    let harness = Harness::new();
    harness
        .transport
        .on(Method::GET, URI, ok("v1", &[("Cache-Control", "max-age=600")]))
        .on(Method::POST, URI, status(500, &[]));

    harness.accessor.get(URI, None).await.unwrap();
    let failed = harness.accessor.post(URI, "data", None).await.unwrap();

    assert_eq!(failed.status().as_u16(), 500);
    assert!(harness.cache.is_empty());
}

#[tokio::test]
async fn head_is_answered_from_cached_get() {
    let harness = Harness::new();
    harness.transport.on(
        Method::GET,
        URI,
        ok("body", &[("Cache-Control", "max-age=60"), ("ETag", "\"x\"")]),
    );
    let resource = harness.accessor.resource(URI).unwrap();

    resource.get(None).await.unwrap();
    let head = resource.head(None).await.unwrap();

    assert!(head.body().is_empty());
    assert_eq!(head.headers().get_one("etag"), Some("\"x\""));
    assert!(!head.is_authoritative());
    assert_eq!(harness.transport.request_count(), 1);
}

#[tokio::test]
async fn head_responses_are_not_stored() {
    let harness = Harness::new();
    harness
        .transport
        .on(Method::HEAD, URI, ok("", &[("Cache-Control", "max-age=60")]));

    harness.accessor.resource(URI).unwrap().head(None).await.unwrap();

    assert!(harness.cache.is_empty());
}

#[tokio::test]
async fn stubbed_get_bypasses_transport_and_cache() {
    let harness = Harness::new();
    harness
        .accessor
        .stub_request(Method::GET, URI, "application/json", "{\"ok\":true}")
        .unwrap();

    let response = harness.accessor.get(URI, None).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers().get_one("content-type"), Some("application/json"));
    assert_eq!(response.body().as_ref(), b"{\"ok\":true}");
    assert_eq!(harness.transport.request_count(), 0);
    assert!(harness.cache.is_empty());
}

#[tokio::test]
async fn only_get_can_be_stubbed() {
    let harness = Harness::new();

    let error = harness
        .accessor
        .stub_request(Method::POST, URI, "text/plain", "nope")
        .unwrap_err();

    assert!(matches!(error, Error::InvalidStub(method) if method == Method::POST));
}

#[tokio::test]
async fn configured_user_agent_is_sent_unless_present() {
    let transport = MockTransport::new();
    transport.on(Method::GET, URI, ok("hi", &[]));
    let accessor = HttpAccessor::builder(transport.clone())
        .config(AccessorConfig {
            user_agent: Some("roost-test/1.0".to_owned()),
            ..AccessorConfig::default()
        })
        .build();

    accessor.get(URI, None).await.unwrap();
    let sent = transport.last_request().unwrap();
    assert_eq!(sent.headers.get_one("user-agent"), Some("roost-test/1.0"));

    let own: HeaderSet = [("User-Agent", "custom")].into_iter().collect();
    accessor.get(URI, own).await.unwrap();
    let sent = transport.last_request().unwrap();
    assert_eq!(sent.headers.get("user-agent"), ["custom"]);
}

#[tokio::test]
async fn resources_are_remembered_per_uri() {
    let harness = Harness::new();
    harness
        .transport
        .on(Method::GET, URI, status(301, &[("Location", "/moved")]))
        .on(Method::GET, "http://example.com/moved", ok("here", &[]));

    harness.accessor.get(URI, None).await.unwrap();

    let resource = harness.accessor.resource(URI).unwrap();
    assert_eq!(resource.effective_uri(), uri("http://example.com/moved"));
    assert!(matches!(
        harness.accessor.resource("not a uri"),
        Err(Error::InvalidUri { .. })
    ));
}

#[tokio::test]
async fn states_are_traced() {
    let collector = SpanCollector::new();
    let _guard = collector.set_default();
    let harness = Harness::new();
    harness
        .transport
        .on(
            Method::GET,
            URI,
            ok("v1", &[("Cache-Control", "max-age=10"), ("ETag", "\"1\"")]),
        )
        .on(Method::GET, URI, status(304, &[]));

    harness.accessor.get(URI, None).await.unwrap();
    assert_eq!(collector.states(), ["CacheCheck", "Fetching"]);

    collector.clear();
    harness.accessor.get(URI, None).await.unwrap();
    assert_eq!(collector.states(), ["CacheCheck"]);

    collector.clear();
    harness.clock.advance_secs(11);
    harness.accessor.get(URI, None).await.unwrap();
    assert_eq!(collector.states(), ["CacheCheck", "Fetching", "Revalidating"]);
}

#[tokio::test]
async fn accessor_from_options() {
    let transport = MockTransport::new();
    transport.on(Method::GET, URI, ok("cached", &[("Cache-Control", "max-age=60")]));
    let accessor = HttpAccessor::from_options(
        transport.clone(),
        &options(json!({ "cache": "local", "timeout": "5s", "user_agent": "roost" })),
    )
    .unwrap();

    assert_eq!(accessor.config().timeout, Duration::from_secs(5));
    accessor.get(URI, None).await.unwrap();
    accessor.get(URI, None).await.unwrap();
    assert_eq!(transport.request_count(), 1);

    let error = HttpAccessor::from_options(
        MockTransport::new(),
        &options(json!({ "retries": 3, "cache": "local", "colour": "blue" })),
    )
    .unwrap_err();
    assert_eq!(error.to_string(), "Unrecognized options: colour, retries");
}
