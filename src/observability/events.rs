//! Structured event sink.
//!
//! Every signal becomes one `tracing` event under the `telemetry::events`
//! target, so the installed subscriber (plain or JSON, see logging.rs)
//! decides where it lands. Attributes and measurements are rendered as
//! debug maps to keep field names stable regardless of signal shape.

use crate::observability::signal::{Attributes, ExceptionRecord, Measurements};
use crate::observability::span::{SpanEnd, SpanId, SpanStart, SpanStatus};
use crate::observability::{SinkError, TelemetrySink};

pub const EVENTS_TARGET: &str = "telemetry::events";

#[derive(Debug, Clone)]
pub struct EventSink {
    service: String,
}

impl EventSink {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl TelemetrySink for EventSink {
    fn name(&self) -> &'static str {
        "events"
    }

    fn record_event(
        &self,
        name: &str,
        attributes: &Attributes,
        measurements: &Measurements,
    ) -> Result<(), SinkError> {
        tracing::info!(
            target: EVENTS_TARGET,
            service = %self.service,
            event = name,
            attributes = ?attributes,
            measurements = ?measurements,
            "event"
        );
        Ok(())
    }

    fn record_metric(&self, name: &str, value: f64, attributes: &Attributes) -> Result<(), SinkError> {
        tracing::info!(
            target: EVENTS_TARGET,
            service = %self.service,
            metric = name,
            value,
            attributes = ?attributes,
            "metric"
        );
        Ok(())
    }

    fn start_span(&self, span: &SpanStart) -> Result<(), SinkError> {
        tracing::debug!(
            target: EVENTS_TARGET,
            service = %self.service,
            span = %span.name,
            span_id = %span.id,
            parent_id = span.parent.map(|p| p.to_string()),
            span_kind = span.kind.as_str(),
            attributes = ?span.attributes,
            "span started"
        );
        Ok(())
    }

    fn add_span_event(&self, span: SpanId, name: &str, attributes: &Attributes) -> Result<(), SinkError> {
        tracing::debug!(
            target: EVENTS_TARGET,
            service = %self.service,
            span_id = %span,
            event = name,
            attributes = ?attributes,
            "span event"
        );
        Ok(())
    }

    fn end_span(&self, span: &SpanEnd) -> Result<(), SinkError> {
        let duration_ms = span.duration.as_secs_f64() * 1000.0;
        match &span.status {
            SpanStatus::Error { kind, message } => tracing::warn!(
                target: EVENTS_TARGET,
                service = %self.service,
                span = %span.name,
                span_id = %span.id,
                status = span.status.as_str(),
                error_kind = %kind,
                error_message = %message,
                duration_ms,
                "span ended"
            ),
            status => tracing::info!(
                target: EVENTS_TARGET,
                service = %self.service,
                span = %span.name,
                span_id = %span.id,
                status = status.as_str(),
                duration_ms,
                "span ended"
            ),
        }
        Ok(())
    }

    fn record_exception(&self, exception: &ExceptionRecord) -> Result<(), SinkError> {
        tracing::error!(
            target: EVENTS_TARGET,
            service = %self.service,
            exception_kind = %exception.kind,
            exception_message = %exception.message,
            span_id = exception.span.map(|s| s.to_string()),
            attributes = ?exception.attributes,
            "exception"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{attributes, CaptureLayer, Telemetry};
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    fn captured(run: impl FnOnce(&Telemetry)) -> CaptureLayer {
        let capture = CaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let telemetry = Telemetry::new(vec![Arc::new(EventSink::new("order-service")) as Arc<dyn TelemetrySink>]);
        tracing::subscriber::with_default(subscriber, || run(&telemetry));
        capture
    }

    #[test]
    fn test_one_record_per_signal() {
        let capture = captured(|telemetry| {
            telemetry.record_event("OrderRequest", attributes([("orderId", "ORD-001")]));
            telemetry.record_metric("order.processing.duration", 12.5, Attributes::new());
            telemetry.record_exception(ExceptionRecord::new("timeout", "deadline elapsed"));

            let mut span = telemetry.span("order.processing").start();
            span.add_event("order.found", Attributes::new());
            span.fail("not_found", "missing");
            span.end();
        });

        let events = capture.events(EVENTS_TARGET);
        let messages: Vec<_> = events.iter().map(|e| e.message().unwrap_or_default()).collect();
        assert_eq!(
            messages,
            ["event", "metric", "exception", "span started", "span event", "span ended"]
        );
        assert!(events.iter().all(|e| e.field("service") == Some("order-service")));

        assert_eq!(events[0].field("event"), Some("OrderRequest"));
        assert!(events[0].field("attributes").unwrap().contains("ORD-001"));
        assert_eq!(events[1].field("value"), Some("12.5"));

        assert_eq!(events[2].level, tracing::Level::ERROR);
        assert_eq!(events[2].field("exception_kind"), Some("timeout"));
        assert_eq!(events[2].field("exception_message"), Some("deadline elapsed"));

        let ended = &events[5];
        assert_eq!(ended.level, tracing::Level::WARN);
        assert_eq!(ended.field("span"), Some("order.processing"));
        assert_eq!(ended.field("status"), Some("error"));
        assert_eq!(ended.field("error_kind"), Some("not_found"));
        assert_eq!(ended.field("error_message"), Some("missing"));
    }

    #[test]
    fn test_successful_span_ends_at_info() {
        let capture = captured(|telemetry| {
            let mut span = telemetry.span("customer.enrichment").start();
            span.succeed();
        });

        let ended = capture.events(EVENTS_TARGET).pop().unwrap();
        assert_eq!(ended.message(), Some("span ended"));
        assert_eq!(ended.level, tracing::Level::INFO);
        assert_eq!(ended.field("status"), Some("ok"));
        assert!(ended.field("error_kind").is_none());
    }
}
