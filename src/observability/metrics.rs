//! Metrics sink and Prometheus exposition.
//!
//! # Metrics
//! - `<name>` (histogram): every `record_metric` call, name sanitised from
//!   dotted form (`customer.enrichment.duration` → `customer_enrichment_duration`)
//! - `telemetry_events_total` (counter): events by `event`
//! - `telemetry_exceptions_total` (counter): exceptions by `kind`
//! - `telemetry_spans_started_total` (counter): spans by `span`
//! - `telemetry_span_events_total` (counter): span events by `event`
//! - `telemetry_spans_total` (counter): ended spans by `span`, `status`
//! - `telemetry_span_duration_ms` (histogram): span durations by `span`, `status`
//!
//! # Design Decisions
//! - Writes go through the `metrics` facade, so they are free when no
//!   recorder is installed and exported when the Prometheus recorder is
//! - The sink also aggregates into its own `DashMap`s; entry-level locking
//!   means concurrent increments never lose updates, and `snapshot()` can be
//!   read back without a recorder
//! - Every series carries a `service` label; attribute values become labels
//!   as-is, so callers keep attributes low-cardinality

use std::collections::BTreeMap;
use std::net::SocketAddr;

use dashmap::DashMap;
use metrics::{describe_counter, describe_histogram, Label, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::observability::signal::{Attributes, ExceptionRecord, Measurements};
use crate::observability::span::{SpanEnd, SpanId, SpanStart};
use crate::observability::{SinkError, TelemetrySink};

const EVENTS_TOTAL: &str = "telemetry_events_total";
const EXCEPTIONS_TOTAL: &str = "telemetry_exceptions_total";
const SPANS_STARTED_TOTAL: &str = "telemetry_spans_started_total";
const SPAN_EVENTS_TOTAL: &str = "telemetry_span_events_total";
const SPANS_TOTAL: &str = "telemetry_spans_total";
const SPAN_DURATION_MS: &str = "telemetry_span_duration_ms";

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_histogram!(
        "order_processing_duration",
        Unit::Milliseconds,
        "Order lookup duration by outcome"
    );
    describe_histogram!(
        "customer_processing_duration",
        Unit::Milliseconds,
        "Customer lookup duration by outcome"
    );
    describe_histogram!(
        "customer_enrichment_duration",
        Unit::Milliseconds,
        "Remote customer fetch duration by outcome"
    );
    describe_histogram!(SPAN_DURATION_MS, Unit::Milliseconds, "Span duration by name and status");
    describe_counter!(EVENTS_TOTAL, "Telemetry events by name");
    describe_counter!(EXCEPTIONS_TOTAL, "Recorded exceptions by kind");
    describe_counter!(SPANS_TOTAL, "Ended spans by name and status");

    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

/// Prometheus-safe form of a dotted metric name.
pub fn prometheus_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// A series: sanitised name plus sorted labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    pub name: String,
    pub labels: Vec<(String, String)>,
}

impl MetricKey {
    fn new<'a>(name: &str, labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut labels: Vec<(String, String)> = labels
            .into_iter()
            .map(|(k, v)| (prometheus_name(k), v.to_string()))
            .collect();
        labels.sort();
        Self {
            name: prometheus_name(name),
            labels,
        }
    }

    fn facade_labels(&self) -> Vec<Label> {
        self.labels
            .iter()
            .map(|(k, v)| Label::new(k.clone(), v.clone()))
            .collect()
    }

    fn has_labels(&self, wanted: &[(&str, &str)]) -> bool {
        wanted.iter().all(|(k, v)| {
            let k = prometheus_name(k);
            self.labels.iter().any(|(lk, lv)| *lk == k && lv == v)
        })
    }
}

/// Aggregate of every value recorded into one histogram series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl HistogramSummary {
    fn observe(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    fn merge(&mut self, other: &HistogramSummary) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Point-in-time copy of the sink's aggregates.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<MetricKey, u64>,
    pub histograms: BTreeMap<MetricKey, HistogramSummary>,
}

impl MetricsSnapshot {
    /// Sum of every counter series with this name carrying all `labels`.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let name = prometheus_name(name);
        self.counters
            .iter()
            .filter(|(key, _)| key.name == name && key.has_labels(labels))
            .map(|(_, value)| *value)
            .sum()
    }

    /// Merged summary of every histogram series with this name carrying all `labels`.
    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> HistogramSummary {
        let name = prometheus_name(name);
        let mut merged = HistogramSummary::default();
        for (key, summary) in &self.histograms {
            if key.name == name && key.has_labels(labels) {
                merged.merge(summary);
            }
        }
        merged
    }
}

#[derive(Debug)]
pub struct MetricsSink {
    service: String,
    counters: DashMap<MetricKey, u64>,
    histograms: DashMap<MetricKey, HistogramSummary>,
}

impl MetricsSink {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            counters: DashMap::new(),
            histograms: DashMap::new(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self
                .counters
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
            histograms: self
                .histograms
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        }
    }

    fn key<'a>(&'a self, name: &str, labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> MetricKey {
        MetricKey::new(
            name,
            labels.into_iter().chain([("service", self.service.as_str())]),
        )
    }

    fn increment(&self, key: MetricKey) {
        metrics::counter!(key.name.clone(), key.facade_labels()).increment(1);
        *self.counters.entry(key).or_default() += 1;
    }

    fn observe(&self, key: MetricKey, value: f64) {
        metrics::histogram!(key.name.clone(), key.facade_labels()).record(value);
        self.histograms.entry(key).or_default().observe(value);
    }
}

impl TelemetrySink for MetricsSink {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn record_event(&self, name: &str, _: &Attributes, _: &Measurements) -> Result<(), SinkError> {
        self.increment(self.key(EVENTS_TOTAL, [("event", name)]));
        Ok(())
    }

    fn record_metric(&self, name: &str, value: f64, attributes: &Attributes) -> Result<(), SinkError> {
        if !value.is_finite() {
            return Err(SinkError::Rejected(format!("{name}: non-finite value {value}")));
        }
        let labels = attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        self.observe(self.key(name, labels), value);
        Ok(())
    }

    fn start_span(&self, span: &SpanStart) -> Result<(), SinkError> {
        self.increment(self.key(SPANS_STARTED_TOTAL, [("span", span.name.as_str())]));
        Ok(())
    }

    fn add_span_event(&self, _: SpanId, name: &str, _: &Attributes) -> Result<(), SinkError> {
        self.increment(self.key(SPAN_EVENTS_TOTAL, [("event", name)]));
        Ok(())
    }

    fn end_span(&self, span: &SpanEnd) -> Result<(), SinkError> {
        let labels = [("span", span.name.as_str()), ("status", span.status.as_str())];
        self.increment(self.key(SPANS_TOTAL, labels));
        self.observe(
            self.key(SPAN_DURATION_MS, labels),
            span.duration.as_secs_f64() * 1000.0,
        );
        Ok(())
    }

    fn record_exception(&self, exception: &ExceptionRecord) -> Result<(), SinkError> {
        self.increment(self.key(EXCEPTIONS_TOTAL, [("kind", exception.kind.as_str())]));
        Ok(())
    }
}
