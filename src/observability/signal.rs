//! The unit of observability output.

use std::collections::BTreeMap;
use std::fmt;

use crate::observability::span::SpanId;

/// String attributes attached to a signal. Ordered so output is deterministic.
pub type Attributes = BTreeMap<String, String>;

/// Numeric measurements attached to a signal (durations, amounts).
pub type Measurements = BTreeMap<String, f64>;

/// Build an attribute map from borrowed pairs.
pub fn attributes<const N: usize>(pairs: [(&str, &str); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// What a [`TelemetrySignal`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Event,
    Metric,
    SpanStart,
    SpanEvent,
    SpanEnd,
    Exception,
}

impl SignalKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Event => "event",
            SignalKind::Metric => "metric",
            SignalKind::SpanStart => "spanStart",
            SignalKind::SpanEvent => "spanEvent",
            SignalKind::SpanEnd => "spanEnd",
            SignalKind::Exception => "exception",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured signal: name, kind, attributes and optional measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySignal {
    pub name: String,
    pub kind: SignalKind,
    pub attributes: Attributes,
    pub measurements: Measurements,
    /// Span the signal belongs to, for span lifecycle signals and exceptions.
    pub span: Option<SpanId>,
}

impl TelemetrySignal {
    pub fn new(kind: SignalKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Attributes::new(),
            measurements: Measurements::new(),
            span: None,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn measurement(&self, key: &str) -> Option<f64> {
        self.measurements.get(key).copied()
    }
}

/// An exception recorded against the current operation.
///
/// `kind` is a stable categorical label (`timeout`, `unexpected_error`, ...);
/// free-form text goes in `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionRecord {
    pub span: Option<SpanId>,
    pub kind: String,
    pub message: String,
    pub attributes: Attributes,
}

impl ExceptionRecord {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span: None,
            kind: kind.into(),
            message: message.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn in_span(mut self, span: SpanId) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}
