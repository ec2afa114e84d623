//! Span capture for asserting pipeline state transitions.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::span::{Attributes, Id};
use tracing::{Dispatch, Subscriber, dispatcher::DefaultGuard};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

const PREFIX: &str = "pipeline.";

/// Captured span information.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    /// Span name (e.g., "pipeline.CacheCheck").
    pub name: String,
    /// Field values recorded at creation, formatted with `Debug`.
    pub fields: Vec<(String, String)>,
}

struct FieldVisitor {
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields.push((field.name().to_owned(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields.push((field.name().to_owned(), value.to_owned()));
    }
}

struct SpanCaptureLayer {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

impl<S> Layer<S> for SpanCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let name = attrs.metadata().name();
        if !name.starts_with(PREFIX) {
            return;
        }
        let mut visitor = FieldVisitor { fields: Vec::new() };
        attrs.record(&mut visitor);
        self.spans.lock().push(CapturedSpan {
            name: name.to_owned(),
            fields: visitor.fields,
        });
    }
}

/// Collects `pipeline.*` spans.
#[derive(Clone)]
pub struct SpanCollector {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    dispatch: Dispatch,
}

impl Default for SpanCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanCollector {
    /// Creates a collector with its own dispatch.
    pub fn new() -> Self {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let subscriber = Registry::default().with(SpanCaptureLayer {
            spans: Arc::clone(&spans),
        });
        SpanCollector {
            spans,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Makes this collector the current thread's subscriber until the guard
    /// drops. Use with single-threaded test runtimes.
    pub fn set_default(&self) -> DefaultGuard {
        tracing::dispatcher::set_default(&self.dispatch)
    }

    /// Pipeline state names in creation order, without the prefix.
    pub fn states(&self) -> Vec<String> {
        self.spans
            .lock()
            .iter()
            .filter_map(|span| span.name.strip_prefix(PREFIX).map(str::to_owned))
            .collect()
    }

    /// Every captured span.
    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().clone()
    }

    /// Forgets captured spans.
    pub fn clear(&self) {
        self.spans.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{Level, span};

    #[test]
    fn captures_prefixed_spans_only() {
        let collector = SpanCollector::new();
        {
            let _guard = collector.set_default();
            let _a = span!(Level::DEBUG, "pipeline.CacheCheck", uri = "http://x/").entered();
            let _b = span!(Level::DEBUG, "unrelated").entered();
            let _c = span!(Level::DEBUG, "pipeline.Fetching").entered();
        }
        assert_eq!(collector.states(), ["CacheCheck", "Fetching"]);
        assert_eq!(collector.spans()[0].fields[0].1, "http://x/");
    }
}
