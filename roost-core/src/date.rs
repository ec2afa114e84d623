//! HTTP-date conversions between header values and [`chrono`] timestamps.

use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// Parses an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT` and the obsolete
/// RFC 850 / asctime forms).
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    httpdate::parse_http_date(value.trim())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Formats a timestamp as an IMF-fixdate.
pub fn format_http_date(timestamp: DateTime<Utc>) -> String {
    httpdate::fmt_http_date(SystemTime::from(timestamp))
}
