//! Test doubles for roost: a scripted transport, counting and failing
//! stores, and a clock that only moves when told to.

pub mod clock;
pub mod store;
pub mod tracing;
pub mod transport;

pub use clock::FixedClock;
pub use store::{FailingStore, MockStore, StoreCounters};
pub use self::tracing::SpanCollector;
pub use transport::{MockTransport, RecordedRequest, Reply};
