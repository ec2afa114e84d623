//! Metrics declaration and recording.
//!
//! With the `metrics` feature enabled, cache and pipeline events are
//! recorded through the [`metrics`](https://docs.rs/metrics) facade under the
//! `roost_*` names below. Without it every recorder is an empty inline
//! function.

use std::time::Duration;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of fresh cache hits.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "roost_cache_hit_total",
            "Total number of requests answered from a fresh cache entry."
        );
        "roost_cache_hit_total"
    };
    /// Track number of lookups without a matching entry.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "roost_cache_miss_total",
            "Total number of lookups without a matching entry."
        );
        "roost_cache_miss_total"
    };
    /// Track number of lookups that found a stale entry.
    pub static ref CACHE_STALE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "roost_cache_stale_total",
            "Total number of lookups that found an entry needing revalidation."
        );
        "roost_cache_stale_total"
    };
    /// Track number of stored responses.
    pub static ref CACHE_STORE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "roost_cache_store_total",
            "Total number of responses stored."
        );
        "roost_cache_store_total"
    };
    /// Track number of invalidated collections.
    pub static ref CACHE_INVALIDATION_COUNTER: &'static str = {
        metrics::describe_counter!(
            "roost_cache_invalidation_total",
            "Total number of URI collections invalidated."
        );
        "roost_cache_invalidation_total"
    };
    /// Histogram of transport call timings.
    pub static ref UPSTREAM_DURATION: &'static str = {
        metrics::describe_histogram!(
            "roost_upstream_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of transport calls in seconds."
        );
        "roost_upstream_duration_seconds"
    };
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_hit() {
    metrics::counter!(*CACHE_HIT_COUNTER).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_miss() {
    metrics::counter!(*CACHE_MISS_COUNTER).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_stale() {
    metrics::counter!(*CACHE_STALE_COUNTER).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_store() {
    metrics::counter!(*CACHE_STORE_COUNTER).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_invalidation() {
    metrics::counter!(*CACHE_INVALIDATION_COUNTER).increment(1);
}

/// Records one transport call, labelled with the transport name and status.
#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_upstream(transport: &str, status: u16, duration: Duration) {
    metrics::histogram!(
        *UPSTREAM_DURATION,
        "transport" => transport.to_owned(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_hit() {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_miss() {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_stale() {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_store() {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_invalidation() {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_upstream(_transport: &str, _status: u16, _duration: Duration) {}
