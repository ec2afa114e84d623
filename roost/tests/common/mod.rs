#![allow(dead_code)]

use std::sync::Arc;

use roost::{
    HttpAccessor, RawResponse, Request, Response, Url,
    cache::{CacheManager, LocalCacheManager},
};
use roost_test::{FixedClock, MockTransport};

pub const URI: &str = "http://example.com/resource";

pub fn uri(value: &str) -> Url {
    Url::parse(value).unwrap()
}

pub fn get(value: &str) -> Request {
    Request::get(uri(value))
}

pub fn ok(body: &'static str, headers: &[(&str, &str)]) -> RawResponse {
    headers
        .iter()
        .fold(RawResponse::new(200, body), |raw, (name, value)| {
            raw.with_header(name, *value)
        })
}

pub fn status(code: u16, headers: &[(&str, &str)]) -> RawResponse {
    headers
        .iter()
        .fold(RawResponse::new(code, ""), |raw, (name, value)| {
            raw.with_header(name, *value)
        })
}

pub fn response(request: &Request, raw: RawResponse) -> Response {
    Response::from_raw(raw, request.clone(), request.uri().clone()).unwrap()
}

pub struct Harness {
    pub transport: MockTransport,
    pub clock: FixedClock,
    pub cache: Arc<LocalCacheManager>,
    pub accessor: HttpAccessor,
}

impl Harness {
    pub fn new() -> Self {
        let transport = MockTransport::new();
        let clock = FixedClock::default();
        let cache = Arc::new(LocalCacheManager::with_clock(Arc::new(clock.clone())));
        let accessor = HttpAccessor::builder(transport.clone())
            .shared_cache_manager(Arc::clone(&cache) as Arc<dyn CacheManager>)
            .build();
        Harness {
            transport,
            clock,
            cache,
            accessor,
        }
    }
}
