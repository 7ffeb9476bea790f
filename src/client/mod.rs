//! Remote customer client subsystem.
//!
//! # Data Flow
//! ```text
//! EnrichmentOrchestrator
//!     → RemoteCustomerClient::fetch(customer_id)
//!         → resilience::with_timeout (bounded wait)
//!         → GET {base_url}/api/customers/{id}
//!     ← EnrichmentOutcome { Success | EmptyResponse | Failure(kind) }
//! ```
//!
//! # Design Decisions
//! - `fetch` has no error channel: every failure mode is a `Failure` variant
//!   labelled with a fixed `FailureKind`, never a raw message
//! - Wall-clock duration is measured around the whole call, timeout included
//! - No retries

pub mod http;
pub mod outcome;

pub use http::HttpCustomerClient;
pub use outcome::{EnrichmentOutcome, FailureKind};

use async_trait::async_trait;
use thiserror::Error;

/// Errors building a client. Fetching never errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid customer service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("customer service URL '{0}' cannot be used as a base")]
    NotABase(String),

    #[error("failed to build HTTP client: {0}")]
    Build(reqwest::Error),
}

/// Fetches customers from the customer service.
#[async_trait]
pub trait RemoteCustomerClient: Send + Sync {
    /// Logical name of the remote service, reported as `peer.service`.
    fn peer_service(&self) -> &str;

    /// URL a fetch for `customer_id` requests.
    fn endpoint(&self, customer_id: &str) -> String;

    async fn fetch(&self, customer_id: &str) -> EnrichmentOutcome;
}
