//! Subscriber layer that keeps every `tracing` span and event it sees.
//!
//! The event and tracing sinks only speak `tracing`, so tests install this
//! layer on a registry to read back exactly what those sinks emitted:
//!
//! ```ignore
//! let capture = CaptureLayer::new();
//! let _guard = tracing::subscriber::set_default(
//!     tracing_subscriber::registry().with(capture.clone()),
//! );
//! ```
//!
//! Field values are kept as their rendered text.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::field::{Field, Visit};
use tracing::span::{self, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

type Fields = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEvent {
    pub target: String,
    pub level: Level,
    pub fields: Fields,
    /// Index into [`CaptureLayer::spans`] of the enclosing span.
    pub parent: Option<usize>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSpan {
    pub target: String,
    pub name: String,
    pub fields: Fields,
    pub parent: Option<usize>,
    pub closed: bool,
}

impl CapturedSpan {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Debug, Default)]
struct Captured {
    spans: Vec<CapturedSpan>,
    events: Vec<CapturedEvent>,
    // Registry ids are reused after close.
    live: HashMap<u64, usize>,
}

/// Cheap to clone; clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct CaptureLayer {
    captured: Arc<Mutex<Captured>>,
}

impl CaptureLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events under `target`, in emission order.
    pub fn events(&self, target: &str) -> Vec<CapturedEvent> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.target == target)
            .cloned()
            .collect()
    }

    /// Events under `target` with the given message and `field == value`.
    pub fn count_events(&self, target: &str, message: &str, field: &str, value: &str) -> usize {
        self.events(target)
            .iter()
            .filter(|e| e.message() == Some(message) && e.field(field) == Some(value))
            .count()
    }

    /// Spans under `target`, in creation order.
    pub fn spans(&self, target: &str) -> Vec<CapturedSpan> {
        self.lock()
            .spans
            .iter()
            .filter(|s| s.target == target)
            .cloned()
            .collect()
    }

    /// Last span whose `field` equals `value`.
    pub fn span_where(&self, field: &str, value: &str) -> Option<CapturedSpan> {
        self.lock()
            .spans
            .iter()
            .rev()
            .find(|s| s.field(field) == Some(value))
            .cloned()
    }

    /// All spans, indexable by [`CapturedEvent::parent`].
    pub fn all_spans(&self) -> Vec<CapturedSpan> {
        self.lock().spans.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Captured> {
        self.captured.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct FieldVisitor<'a>(&'a mut Fields);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = Fields::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        let parent_id = ctx
            .span(id)
            .and_then(|span| span.parent())
            .map(|parent| parent.id().into_u64());

        let mut captured = self.lock();
        let parent = parent_id.and_then(|p| captured.live.get(&p).copied());
        let index = captured.spans.len();
        captured.spans.push(CapturedSpan {
            target: attrs.metadata().target().to_string(),
            name: attrs.metadata().name().to_string(),
            fields,
            parent,
            closed: false,
        });
        captured.live.insert(id.into_u64(), index);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        let mut captured = self.lock();
        if let Some(index) = captured.live.get(&id.into_u64()).copied() {
            values.record(&mut FieldVisitor(&mut captured.spans[index].fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = Fields::new();
        event.record(&mut FieldVisitor(&mut fields));
        let parent_id = ctx.event_span(event).map(|span| span.id().into_u64());

        let mut captured = self.lock();
        let parent = parent_id.and_then(|p| captured.live.get(&p).copied());
        captured.events.push(CapturedEvent {
            target: event.metadata().target().to_string(),
            level: *event.metadata().level(),
            fields,
            parent,
        });
    }

    fn on_close(&self, id: Id, _ctx: Context<'_, S>) {
        let mut captured = self.lock();
        if let Some(index) = captured.live.remove(&id.into_u64()) {
            captured.spans[index].closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_captures_spans_events_and_late_fields() {
        let capture = CaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            let outer = tracing::info_span!(target: "lookup", "outer", status = tracing::field::Empty);
            let inner = tracing::info_span!(target: "lookup", parent: &outer, "inner", id = 7);
            tracing::warn!(target: "lookup", parent: &inner, kind = %"timeout", "failed");
            outer.record("status", "OK");
            drop(inner);
        });

        let spans = capture.spans("lookup");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].field("status"), Some("OK"));
        assert_eq!(spans[1].field("id"), Some("7"));
        assert_eq!(spans[1].parent, Some(0));
        assert!(spans[1].closed);

        let events = capture.events("lookup");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].message(), Some("failed"));
        assert_eq!(events[0].field("kind"), Some("timeout"));
        assert_eq!(events[0].parent, Some(1));
        assert_eq!(capture.count_events("lookup", "failed", "kind", "timeout"), 1);
        assert!(capture.events("other").is_empty());
    }
}
