//! Result of one remote customer fetch.

use std::fmt;
use std::time::Duration;

use crate::domain::Customer;

/// Stable, low-cardinality failure label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The deadline elapsed before a response arrived.
    Timeout,
    /// The connection could not be established or was lost.
    ConnectionError,
    /// The remote answered with a non-2xx status.
    HttpError,
    /// The payload was not a customer.
    DecodeError,
    /// Anything else, including a panic inside the fetch.
    Unexpected,
}

impl FailureKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::ConnectionError => "connection_error",
            FailureKind::HttpError => "http_error",
            FailureKind::DecodeError => "decode_error",
            FailureKind::Unexpected => "unexpected_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state outcome; the client never returns an error.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    Success {
        customer: Customer,
        duration: Duration,
    },
    EmptyResponse {
        duration: Duration,
    },
    Failure {
        kind: FailureKind,
        detail: String,
        duration: Duration,
    },
}

impl EnrichmentOutcome {
    pub fn failure(kind: FailureKind, detail: impl Into<String>, duration: Duration) -> Self {
        EnrichmentOutcome::Failure {
            kind,
            detail: detail.into(),
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            EnrichmentOutcome::Success { duration, .. }
            | EnrichmentOutcome::EmptyResponse { duration }
            | EnrichmentOutcome::Failure { duration, .. } => *duration,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration().as_secs_f64() * 1000.0
    }

    /// Metric tag: only a fetched customer counts as success.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            EnrichmentOutcome::Success { .. } => "success",
            EnrichmentOutcome::EmptyResponse { .. } | EnrichmentOutcome::Failure { .. } => "failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let labels: Vec<_> = [
            FailureKind::Timeout,
            FailureKind::ConnectionError,
            FailureKind::HttpError,
            FailureKind::DecodeError,
            FailureKind::Unexpected,
        ]
        .iter()
        .map(FailureKind::as_str)
        .collect();
        assert_eq!(
            labels,
            ["timeout", "connection_error", "http_error", "decode_error", "unexpected_error"]
        );
    }

    #[test]
    fn test_empty_response_is_tagged_failure() {
        let empty = EnrichmentOutcome::EmptyResponse {
            duration: Duration::from_millis(4),
        };
        assert_eq!(empty.outcome_label(), "failure");
        assert_eq!(empty.duration_ms(), 4.0);

        let failed = EnrichmentOutcome::failure(FailureKind::Timeout, "slow", Duration::from_millis(9));
        assert_eq!(failed.outcome_label(), "failure");
        assert_eq!(failed.duration(), Duration::from_millis(9));
    }
}
