//! Freshness lifetime computation.
//!
//! Directive precedence is `no-store` > `no-cache` > `max-age` > `Expires`.
//! `no-store` never reaches this module: such responses are not cacheable.

use chrono::{DateTime, TimeDelta, Utc};
use roost_core::{CacheControl, HeaderSet, date::parse_http_date};

/// How long a response stored at `stored_at` stays fresh.
///
/// - `Cache-Control: no-cache` gives zero: the entry is kept for conditional
///   requests but always revalidated.
/// - `Cache-Control: max-age` wins over `Expires`.
/// - `Expires − Date`, where a missing or invalid `Date` means `stored_at`.
///   An invalid `Expires` is a date in the past.
/// - Otherwise zero.
pub fn freshness_lifetime(headers: &HeaderSet, stored_at: DateTime<Utc>) -> TimeDelta {
    if let Some(cache_control) = CacheControl::from_headers(headers) {
        if cache_control.no_cache() {
            return TimeDelta::zero();
        }
        if let Some(max_age) = cache_control.max_age() {
            return TimeDelta::seconds(i64::from(max_age));
        }
    }

    let Some(expires) = headers.get_one("expires") else {
        return TimeDelta::zero();
    };
    let Some(expires) = parse_http_date(expires) else {
        return TimeDelta::zero();
    };
    let date = headers
        .get_one("date")
        .and_then(parse_http_date)
        .unwrap_or(stored_at);
    (expires - date).max(TimeDelta::zero())
}

/// Instant after which a response stored at `stored_at` is stale, or `None`
/// when it is stale from the start.
pub fn expires_at(headers: &HeaderSet, stored_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lifetime = freshness_lifetime(headers, stored_at);
    if lifetime <= TimeDelta::zero() {
        return None;
    }
    stored_at.checked_add_signed(lifetime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2008, 5, 23, hour, 0, 0).unwrap()
    }

    fn header_set(pairs: &[(&str, &str)]) -> HeaderSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn max_age_wins_over_expires() {
        let headers = header_set(&[
            ("Cache-Control", "max-age=60"),
            ("Date", "Fri, 23 May 2008 12:00:00 GMT"),
            ("Expires", "Fri, 23 May 2008 14:00:00 GMT"),
        ]);
        assert_eq!(freshness_lifetime(&headers, at(12)), TimeDelta::seconds(60));
    }

    #[test]
    fn expires_minus_date() {
        let headers = header_set(&[
            ("Date", "Fri, 23 May 2008 12:00:00 GMT"),
            ("Expires", "Fri, 23 May 2008 14:00:00 GMT"),
        ]);
        assert_eq!(freshness_lifetime(&headers, at(13)), TimeDelta::hours(2));
    }

    #[test]
    fn expires_without_date_uses_stored_at() {
        let headers = header_set(&[("Expires", "Fri, 23 May 2008 14:00:00 GMT")]);
        assert_eq!(freshness_lifetime(&headers, at(13)), TimeDelta::hours(1));
        assert_eq!(expires_at(&headers, at(13)), Some(at(14)));
    }

    #[test]
    fn no_cache_wins_over_max_age() {
        let headers = header_set(&[("Cache-Control", "no-cache, max-age=3600")]);
        assert_eq!(freshness_lifetime(&headers, at(12)), TimeDelta::zero());
        assert_eq!(expires_at(&headers, at(12)), None);
    }

    #[test]
    fn missing_or_invalid_information_is_stale() {
        assert_eq!(freshness_lifetime(&HeaderSet::new(), at(12)), TimeDelta::zero());

        let headers = header_set(&[("Expires", "0")]);
        assert_eq!(freshness_lifetime(&headers, at(12)), TimeDelta::zero());

        let headers = header_set(&[
            ("Date", "Fri, 23 May 2008 14:00:00 GMT"),
            ("Expires", "Fri, 23 May 2008 12:00:00 GMT"),
        ]);
        assert_eq!(expires_at(&headers, at(14)), None);
    }
}
