//! Tracing sink.
//!
//! Mirrors every telemetry span as a `tracing` span under the
//! `telemetry::spans` target, nested by parent id, with OpenTelemetry-style
//! field names (`otel.name`, `otel.kind`, `otel.status_code`) so an exporting
//! subscriber layer can forward them unchanged. Only built when a telemetry
//! connection string is configured; otherwise startup wires a `NoopSink`.

use dashmap::DashMap;

use crate::observability::signal::{Attributes, ExceptionRecord, Measurements};
use crate::observability::span::{SpanEnd, SpanId, SpanStart, SpanStatus};
use crate::observability::{SinkError, TelemetrySink};

pub const SPANS_TARGET: &str = "telemetry::spans";

pub struct TracingSink {
    service: String,
    endpoint: Option<String>,
    spans: DashMap<SpanId, tracing::Span>,
}

impl TracingSink {
    pub fn new(service: impl Into<String>, connection_string: &str) -> Self {
        Self {
            service: service.into(),
            endpoint: ingestion_endpoint(connection_string).map(str::to_string),
            spans: DashMap::new(),
        }
    }

    /// Ingestion endpoint named by the connection string, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Spans started on this sink and not yet ended.
    pub fn open_spans(&self) -> usize {
        self.spans.len()
    }
}

impl std::fmt::Debug for TracingSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracingSink")
            .field("service", &self.service)
            .field("endpoint", &self.endpoint)
            .field("open_spans", &self.spans.len())
            .finish()
    }
}

/// `IngestionEndpoint` from a `Key=Value;Key=Value` connection string.
fn ingestion_endpoint(connection_string: &str) -> Option<&str> {
    connection_string
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("IngestionEndpoint"))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

impl TelemetrySink for TracingSink {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn record_event(
        &self,
        name: &str,
        attributes: &Attributes,
        measurements: &Measurements,
    ) -> Result<(), SinkError> {
        tracing::trace!(
            target: SPANS_TARGET,
            service = %self.service,
            event = name,
            attributes = ?attributes,
            measurements = ?measurements,
            "custom event"
        );
        Ok(())
    }

    fn record_metric(&self, name: &str, value: f64, attributes: &Attributes) -> Result<(), SinkError> {
        tracing::trace!(
            target: SPANS_TARGET,
            service = %self.service,
            metric = name,
            value,
            attributes = ?attributes,
            "custom metric"
        );
        Ok(())
    }

    fn start_span(&self, span: &SpanStart) -> Result<(), SinkError> {
        // Resolve the parent before inserting; holding a map guard across
        // the insert could deadlock on the same shard.
        let parent_known = span.parent.map_or(true, |id| self.spans.contains_key(&id));
        let parent = span
            .parent
            .and_then(|id| self.spans.get(&id).and_then(|s| s.value().id()));

        let traced = tracing::info_span!(
            target: SPANS_TARGET,
            parent: parent,
            "telemetry_span",
            otel.name = %span.name,
            otel.kind = span.kind.as_str(),
            span.id = %span.id,
            service = %self.service,
            attributes = ?span.attributes,
            otel.status_code = tracing::field::Empty,
            otel.status_message = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        self.spans.insert(span.id, traced);

        match span.parent {
            Some(parent) if !parent_known => Err(SinkError::UnknownSpan(parent)),
            _ => Ok(()),
        }
    }

    fn add_span_event(&self, span: SpanId, name: &str, attributes: &Attributes) -> Result<(), SinkError> {
        let traced = self.spans.get(&span).ok_or(SinkError::UnknownSpan(span))?;
        tracing::info!(
            target: SPANS_TARGET,
            parent: traced.value(),
            event = name,
            attributes = ?attributes,
            "span event"
        );
        Ok(())
    }

    fn end_span(&self, span: &SpanEnd) -> Result<(), SinkError> {
        let (_, traced) = self.spans.remove(&span.id).ok_or(SinkError::UnknownSpan(span.id))?;

        let status_code = match &span.status {
            SpanStatus::Unset => "UNSET",
            SpanStatus::Ok => "OK",
            SpanStatus::Error { message, .. } => {
                traced.record("otel.status_message", message.as_str());
                "ERROR"
            }
        };
        traced.record("otel.status_code", status_code);
        traced.record("duration_ms", span.duration.as_secs_f64() * 1000.0);
        Ok(())
    }

    fn record_exception(&self, exception: &ExceptionRecord) -> Result<(), SinkError> {
        let parent = exception
            .span
            .and_then(|id| self.spans.get(&id).and_then(|s| s.value().id()));
        tracing::error!(
            target: SPANS_TARGET,
            parent: parent,
            service = %self.service,
            exception_kind = %exception.kind,
            exception_message = %exception.message,
            attributes = ?exception.attributes,
            "exception"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::Telemetry;
    use std::sync::Arc;

    #[test]
    fn test_ingestion_endpoint() {
        assert_eq!(
            ingestion_endpoint("InstrumentationKey=abc;IngestionEndpoint=https://ingest.example.com/"),
            Some("https://ingest.example.com/")
        );
        assert_eq!(ingestion_endpoint("InstrumentationKey=abc"), None);
        assert_eq!(ingestion_endpoint("IngestionEndpoint="), None);
    }

    #[test]
    fn test_spans_are_removed_when_ended() {
        let sink = Arc::new(TracingSink::new("order-service", "InstrumentationKey=abc"));
        let telemetry = Telemetry::new(vec![sink.clone() as Arc<dyn TelemetrySink>]);

        let parent = telemetry.span("order.processing").start();
        let child = telemetry.span("customer.enrichment").parent(Some(parent.id())).start();
        assert_eq!(sink.open_spans(), 2);

        child.end();
        assert_eq!(sink.open_spans(), 1);
        drop(parent);
        assert_eq!(sink.open_spans(), 0);
    }

    #[test]
    fn test_status_and_nesting_reach_the_subscriber() {
        use crate::observability::{attributes, CaptureLayer, ExceptionRecord};
        use tracing_subscriber::layer::SubscriberExt;

        let capture = CaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let sink = Arc::new(TracingSink::new("order-service", ""));
        let telemetry = Telemetry::new(vec![sink as Arc<dyn TelemetrySink>]);

        tracing::subscriber::with_default(subscriber, || {
            let mut order = telemetry.span("order.processing").start();
            let mut enrichment = telemetry.span("customer.enrichment").parent(Some(order.id())).start();
            enrichment.add_event("http.request.start", attributes([("http.method", "GET")]));
            telemetry.record_exception(ExceptionRecord::new("timeout", "deadline elapsed").in_span(enrichment.id()));
            enrichment.fail("timeout", "deadline elapsed");
            enrichment.end();
            order.succeed();
        });

        let spans = capture.spans(SPANS_TARGET);
        assert_eq!(spans.len(), 2);
        let (order, enrichment) = (&spans[0], &spans[1]);
        assert_eq!(order.field("otel.name"), Some("order.processing"));
        assert_eq!(order.field("otel.status_code"), Some("OK"));
        assert!(order.field("otel.status_message").is_none());
        assert_eq!(enrichment.field("otel.name"), Some("customer.enrichment"));
        assert_eq!(enrichment.field("otel.status_code"), Some("ERROR"));
        assert_eq!(enrichment.field("otel.status_message"), Some("deadline elapsed"));
        assert!(enrichment.field("duration_ms").is_some());
        assert_eq!(enrichment.parent, Some(0));
        assert!(spans.iter().all(|s| s.closed));

        let events = capture.events(SPANS_TARGET);
        let exception = events.iter().find(|e| e.message() == Some("exception")).unwrap();
        assert_eq!(exception.field("exception_kind"), Some("timeout"));
        assert_eq!(exception.parent, Some(1));
        let span_event = events.iter().find(|e| e.message() == Some("span event")).unwrap();
        assert_eq!(span_event.field("event"), Some("http.request.start"));
        assert_eq!(span_event.parent, Some(1));
    }

    #[test]
    fn test_unknown_span_is_reported() {
        let sink = TracingSink::new("svc", "");
        assert!(matches!(
            sink.add_span_event(SpanId(42), "late", &Attributes::new()),
            Err(SinkError::UnknownSpan(SpanId(42)))
        ));
        assert!(sink.endpoint().is_none());
    }
}
