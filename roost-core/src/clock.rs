//! Time source used for freshness calculations.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Cache managers never call [`Utc::now`] directly, so tests can pin time to a
/// fixed instant and advance it explicitly.
pub trait Clock: Debug + Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
