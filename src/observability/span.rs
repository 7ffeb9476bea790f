//! Span lifecycle.
//!
//! # States
//! ```text
//! NotStarted → Started → {Succeeded, Failed} → Ended
//!                 └──────────────────────────────↗
//! ```
//!
//! `Ended` is terminal. [`SpanGuard`] is the only way to hold an open span:
//! it emits the span start when created and the span end exactly once, on
//! `end()` or on drop, so early returns and unwinding both close the span.

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::observability::signal::Attributes;
use crate::observability::Telemetry;

/// Identifier of a span, unique within one [`Telemetry`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(pub u64);

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Relationship of the span to the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanKind {
    #[default]
    Internal,
    Client,
    Server,
}

impl SpanKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Internal => "internal",
            SpanKind::Client => "client",
            SpanKind::Server => "server",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanState {
    NotStarted,
    Started,
    Succeeded,
    Failed,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal span transition {from:?} -> {to:?}")]
pub struct SpanTransitionError {
    pub from: SpanState,
    pub to: SpanState,
}

impl SpanState {
    /// Validate a transition, returning the new state.
    pub fn transition(self, to: SpanState) -> Result<SpanState, SpanTransitionError> {
        use SpanState::*;
        match (self, to) {
            (NotStarted, Started)
            | (Started, Succeeded)
            | (Started, Failed)
            | (Started, Ended)
            | (Succeeded, Ended)
            | (Failed, Ended) => Ok(to),
            (from, to) => Err(SpanTransitionError { from, to }),
        }
    }
}

/// Final status reported with a span end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpanStatus {
    #[default]
    Unset,
    Ok,
    Error { kind: String, message: String },
}

impl SpanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanStatus::Unset => "unset",
            SpanStatus::Ok => "ok",
            SpanStatus::Error { .. } => "error",
        }
    }
}

/// Span start as delivered to sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanStart {
    pub id: SpanId,
    pub parent: Option<SpanId>,
    pub name: String,
    pub kind: SpanKind,
    pub attributes: Attributes,
}

/// Span end as delivered to sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanEnd {
    pub id: SpanId,
    pub name: String,
    pub status: SpanStatus,
    pub duration: Duration,
}

/// Builder returned by [`Telemetry::span`].
#[must_use = "a span is only opened by calling `start`"]
pub struct SpanBuilder<'a> {
    telemetry: &'a Telemetry,
    name: String,
    kind: SpanKind,
    parent: Option<SpanId>,
    attributes: Attributes,
}

impl<'a> SpanBuilder<'a> {
    pub(crate) fn new(telemetry: &'a Telemetry, name: impl Into<String>) -> Self {
        Self {
            telemetry,
            name: name.into(),
            kind: SpanKind::default(),
            parent: None,
            attributes: Attributes::new(),
        }
    }

    pub fn kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn parent(mut self, parent: Option<SpanId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Open the span on every sink.
    pub fn start(self) -> SpanGuard<'a> {
        let start = SpanStart {
            id: self.telemetry.next_span_id(),
            parent: self.parent,
            name: self.name,
            kind: self.kind,
            attributes: self.attributes,
        };
        self.telemetry.dispatch_span_start(&start);

        SpanGuard {
            telemetry: self.telemetry,
            id: start.id,
            name: start.name,
            state: SpanState::Started,
            status: SpanStatus::Unset,
            started_at: Instant::now(),
        }
    }
}

/// Scoped ownership of an open span.
pub struct SpanGuard<'a> {
    telemetry: &'a Telemetry,
    id: SpanId,
    name: String,
    state: SpanState,
    status: SpanStatus,
    started_at: Instant,
}

impl SpanGuard<'_> {
    pub fn id(&self) -> SpanId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SpanState {
        self.state
    }

    pub fn add_event(&self, name: &str, attributes: Attributes) {
        self.telemetry.dispatch_span_event(self.id, name, &attributes);
    }

    pub fn succeed(&mut self) {
        if self.advance(SpanState::Succeeded) {
            self.status = SpanStatus::Ok;
        }
    }

    pub fn fail(&mut self, kind: &str, message: impl Into<String>) {
        if self.advance(SpanState::Failed) {
            self.status = SpanStatus::Error {
                kind: kind.to_string(),
                message: message.into(),
            };
        }
    }

    /// End the span now. Dropping the guard has the same effect.
    pub fn end(mut self) {
        self.finish();
    }

    fn advance(&mut self, to: SpanState) -> bool {
        match self.state.transition(to) {
            Ok(next) => {
                self.state = next;
                true
            }
            Err(e) => {
                tracing::warn!(span = %self.name, span_id = %self.id, error = %e, "Ignoring span state change");
                false
            }
        }
    }

    fn finish(&mut self) {
        if self.state == SpanState::Ended || !self.advance(SpanState::Ended) {
            return;
        }
        let end = SpanEnd {
            id: self.id,
            name: std::mem::take(&mut self.name),
            status: std::mem::take(&mut self.status),
            duration: self.started_at.elapsed(),
        };
        self.telemetry.dispatch_span_end(&end);
    }
}

impl Drop for SpanGuard<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
