//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! LookupService / EnrichmentOrchestrator
//!     → Telemetry (fan-out, one call per signal)
//!         → events.rs   (structured event log)
//!         → metrics.rs  (counters + histograms, Prometheus exporter)
//!         → trace.rs    (span tree, active only with a connection string)
//!         → recording.rs (in-memory capture, tests)
//!
//! logging.rs installs the subscriber the event and span sinks write through.
//! ```
//!
//! # Design Decisions
//! - One trait, many sinks: orchestration never knows which backends exist
//! - Every sink sees every call; a sink error or panic is logged and isolated, never
//!   skips the remaining sinks and never reaches the caller
//! - No process-wide client: a `Telemetry` handle is passed to whoever emits
//! - Span lifetime is a scoped guard (see span.rs)

pub mod capture;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod recording;
pub mod signal;
pub mod span;
pub mod trace;

pub use capture::CaptureLayer;
pub use events::EventSink;
pub use metrics::MetricsSink;
pub use recording::RecordingSink;
pub use signal::{attributes, Attributes, ExceptionRecord, Measurements, SignalKind, TelemetrySignal};
pub use span::{SpanBuilder, SpanEnd, SpanGuard, SpanId, SpanKind, SpanStart, SpanState, SpanStatus};
pub use trace::TracingSink;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::resilience::Fault;

/// Errors a sink may report for a single signal.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The span was never started on this sink, or already ended.
    #[error("span {0} is not open")]
    UnknownSpan(SpanId),

    /// The backend refused the signal.
    #[error("signal rejected: {0}")]
    Rejected(String),

    /// The sink panicked while handling the signal.
    #[error("sink panicked: {0}")]
    Panicked(String),
}

/// An observability backend.
///
/// Implementations must be safe to call concurrently from many requests.
pub trait TelemetrySink: Send + Sync {
    /// Short name used in logs when the sink misbehaves.
    fn name(&self) -> &'static str;

    fn record_event(
        &self,
        name: &str,
        attributes: &Attributes,
        measurements: &Measurements,
    ) -> Result<(), SinkError>;

    fn record_metric(&self, name: &str, value: f64, attributes: &Attributes) -> Result<(), SinkError>;

    fn start_span(&self, span: &SpanStart) -> Result<(), SinkError>;

    fn add_span_event(&self, span: SpanId, name: &str, attributes: &Attributes) -> Result<(), SinkError>;

    fn end_span(&self, span: &SpanEnd) -> Result<(), SinkError>;

    fn record_exception(&self, exception: &ExceptionRecord) -> Result<(), SinkError>;
}

/// Sink that accepts and discards everything.
///
/// Stands in for the trace exporter when no connection string is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn record_event(&self, _: &str, _: &Attributes, _: &Measurements) -> Result<(), SinkError> {
        Ok(())
    }

    fn record_metric(&self, _: &str, _: f64, _: &Attributes) -> Result<(), SinkError> {
        Ok(())
    }

    fn start_span(&self, _: &SpanStart) -> Result<(), SinkError> {
        Ok(())
    }

    fn add_span_event(&self, _: SpanId, _: &str, _: &Attributes) -> Result<(), SinkError> {
        Ok(())
    }

    fn end_span(&self, _: &SpanEnd) -> Result<(), SinkError> {
        Ok(())
    }

    fn record_exception(&self, _: &ExceptionRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Handle to the configured set of sinks. Cheap to clone.
#[derive(Clone)]
pub struct Telemetry {
    inner: Arc<TelemetryInner>,
}

struct TelemetryInner {
    sinks: Vec<Arc<dyn TelemetrySink>>,
    next_span: AtomicU64,
}

impl Telemetry {
    pub fn new(sinks: Vec<Arc<dyn TelemetrySink>>) -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                sinks,
                next_span: AtomicU64::new(1),
            }),
        }
    }

    /// Telemetry with no sinks at all.
    pub fn disabled() -> Self {
        Self::new(Vec::new())
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.inner.sinks.iter().map(|sink| sink.name()).collect()
    }

    pub fn record_event(&self, name: &str, attributes: Attributes) {
        self.record_event_with(name, attributes, Measurements::new());
    }

    pub fn record_event_with(&self, name: &str, attributes: Attributes, measurements: Measurements) {
        self.dispatch("record_event", |sink| sink.record_event(name, &attributes, &measurements));
    }

    pub fn record_metric(&self, name: &str, value: f64, attributes: Attributes) {
        self.dispatch("record_metric", |sink| sink.record_metric(name, value, &attributes));
    }

    pub fn record_exception(&self, exception: ExceptionRecord) {
        self.dispatch("record_exception", |sink| sink.record_exception(&exception));
    }

    /// Describe a span; nothing is emitted until [`SpanBuilder::start`].
    pub fn span(&self, name: impl Into<String>) -> SpanBuilder<'_> {
        SpanBuilder::new(self, name)
    }

    pub(crate) fn next_span_id(&self) -> SpanId {
        SpanId(self.inner.next_span.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn dispatch_span_start(&self, span: &SpanStart) {
        self.dispatch("start_span", |sink| sink.start_span(span));
    }

    pub(crate) fn dispatch_span_event(&self, span: SpanId, name: &str, attributes: &Attributes) {
        self.dispatch("add_span_event", |sink| sink.add_span_event(span, name, attributes));
    }

    pub(crate) fn dispatch_span_end(&self, span: &SpanEnd) {
        self.dispatch("end_span", |sink| sink.end_span(span));
    }

    fn dispatch<F>(&self, operation: &'static str, call: F)
    where
        F: Fn(&dyn TelemetrySink) -> Result<(), SinkError>,
    {
        for sink in &self.inner.sinks {
            let result = panic::catch_unwind(AssertUnwindSafe(|| call(sink.as_ref())))
                .unwrap_or_else(|payload| Err(SinkError::Panicked(Fault::from_panic(payload).message)));
            if let Err(e) = result {
                tracing::warn!(sink = sink.name(), operation, error = %e, "Telemetry sink rejected signal");
            }
        }
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("sinks", &self.sink_names())
            .finish()
    }
}
