//! In-memory sink that keeps every signal it receives.
//!
//! Used by tests to assert exactly which signals a flow produced, and
//! handy in local debugging when wired next to the real sinks.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::observability::signal::{
    Attributes, ExceptionRecord, Measurements, SignalKind, TelemetrySignal,
};
use crate::observability::span::{SpanEnd, SpanId, SpanStart, SpanStatus};
use crate::observability::{SinkError, TelemetrySink};

#[derive(Debug, Default)]
pub struct RecordingSink {
    signals: Mutex<Vec<TelemetrySignal>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in arrival order.
    pub fn signals(&self) -> Vec<TelemetrySignal> {
        self.lock().clone()
    }

    pub fn matching(&self, kind: SignalKind, name: &str) -> Vec<TelemetrySignal> {
        self.lock()
            .iter()
            .filter(|s| s.kind == kind && s.name == name)
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: SignalKind, name: &str) -> usize {
        self.lock()
            .iter()
            .filter(|s| s.kind == kind && s.name == name)
            .count()
    }

    pub fn count_kind(&self, kind: SignalKind) -> usize {
        self.lock().iter().filter(|s| s.kind == kind).count()
    }

    pub fn last(&self, kind: SignalKind, name: &str) -> Option<TelemetrySignal> {
        self.lock()
            .iter()
            .rev()
            .find(|s| s.kind == kind && s.name == name)
            .cloned()
    }

    /// Status (`ok`, `error`, `unset`) of the last ended span with this name.
    pub fn span_status(&self, name: &str) -> Option<String> {
        self.last(SignalKind::SpanEnd, name)
            .and_then(|s| s.attributes.get("status").cloned())
    }

    /// Spans started but not yet ended.
    pub fn open_spans(&self) -> usize {
        let signals = self.lock();
        let started = signals.iter().filter(|s| s.kind == SignalKind::SpanStart).count();
        let ended = signals.iter().filter(|s| s.kind == SignalKind::SpanEnd).count();
        started.saturating_sub(ended)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, signal: TelemetrySignal) -> Result<(), SinkError> {
        self.lock().push(signal);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TelemetrySignal>> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TelemetrySink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn record_event(
        &self,
        name: &str,
        attributes: &Attributes,
        measurements: &Measurements,
    ) -> Result<(), SinkError> {
        let mut signal = TelemetrySignal::new(SignalKind::Event, name);
        signal.attributes = attributes.clone();
        signal.measurements = measurements.clone();
        self.push(signal)
    }

    fn record_metric(&self, name: &str, value: f64, attributes: &Attributes) -> Result<(), SinkError> {
        let mut signal = TelemetrySignal::new(SignalKind::Metric, name);
        signal.attributes = attributes.clone();
        signal.measurements.insert("value".to_string(), value);
        self.push(signal)
    }

    fn start_span(&self, span: &SpanStart) -> Result<(), SinkError> {
        let mut signal = TelemetrySignal::new(SignalKind::SpanStart, &span.name);
        signal.attributes = span.attributes.clone();
        signal.attributes.insert("span.kind".to_string(), span.kind.as_str().to_string());
        if let Some(parent) = span.parent {
            signal.attributes.insert("parent.id".to_string(), parent.to_string());
        }
        signal.span = Some(span.id);
        self.push(signal)
    }

    fn add_span_event(&self, span: SpanId, name: &str, attributes: &Attributes) -> Result<(), SinkError> {
        let mut signal = TelemetrySignal::new(SignalKind::SpanEvent, name);
        signal.attributes = attributes.clone();
        signal.span = Some(span);
        self.push(signal)
    }

    fn end_span(&self, span: &SpanEnd) -> Result<(), SinkError> {
        let mut signal = TelemetrySignal::new(SignalKind::SpanEnd, &span.name);
        signal.attributes.insert("status".to_string(), span.status.as_str().to_string());
        if let SpanStatus::Error { kind, message } = &span.status {
            signal.attributes.insert("error.kind".to_string(), kind.clone());
            signal.attributes.insert("error.message".to_string(), message.clone());
        }
        signal
            .measurements
            .insert("duration_ms".to_string(), span.duration.as_secs_f64() * 1000.0);
        signal.span = Some(span.id);
        self.push(signal)
    }

    fn record_exception(&self, exception: &ExceptionRecord) -> Result<(), SinkError> {
        let mut signal = TelemetrySignal::new(SignalKind::Exception, &exception.kind);
        signal.attributes = exception.attributes.clone();
        signal.attributes.insert("message".to_string(), exception.message.clone());
        signal.span = exception.span;
        self.push(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::attributes;

    #[test]
    fn test_records_in_order() {
        let sink = RecordingSink::new();
        sink.record_event("A", &attributes([("k", "v")]), &Measurements::new()).unwrap();
        sink.record_metric("m", 2.5, &Attributes::new()).unwrap();
        sink.record_exception(&ExceptionRecord::new("timeout", "slow")).unwrap();

        let signals = sink.signals();
        assert_eq!(signals.len(), 3);
        assert_eq!(signals[0].kind, SignalKind::Event);
        assert_eq!(signals[0].attribute("k"), Some("v"));
        assert_eq!(signals[1].measurement("value"), Some(2.5));
        assert_eq!(signals[2].attribute("message"), Some("slow"));

        sink.clear();
        assert!(sink.signals().is_empty());
    }

    #[test]
    fn test_open_span_accounting() {
        let sink = RecordingSink::new();
        let start = SpanStart {
            id: SpanId(7),
            parent: None,
            name: "s".into(),
            kind: Default::default(),
            attributes: Attributes::new(),
        };
        sink.start_span(&start).unwrap();
        assert_eq!(sink.open_spans(), 1);

        sink.end_span(&SpanEnd {
            id: SpanId(7),
            name: "s".into(),
            status: SpanStatus::Ok,
            duration: std::time::Duration::from_millis(5),
        })
        .unwrap();
        assert_eq!(sink.open_spans(), 0);
        assert_eq!(sink.span_status("s").as_deref(), Some("ok"));
    }
}
