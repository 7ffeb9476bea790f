//! Order enrichment subsystem.
//!
//! # Data Flow
//! ```text
//! LookupService (order found, top-level span open)
//!     → EnrichmentOrchestrator::enrich(order, parent span)
//!         → client span "customer.enrichment" opened
//!         → RemoteCustomerClient::fetch (fault-isolated)
//!         → Success | EmptyResponse | Failure → signal set for that outcome
//!         → span ended
//!     ← the order, with the customer attached only on Success
//! ```
//!
//! # Design Decisions
//! - `enrich` has no error channel; dependency failures degrade to an
//!   unenriched order
//! - An empty response keeps the span successful but tags the duration
//!   metric as a failure; a real failure marks both
//! - Metric labels never carry order or customer ids

pub mod orchestrator;

pub use orchestrator::EnrichmentOrchestrator;

use async_trait::async_trait;

use crate::observability::SpanId;

/// Optional post-lookup step of a [`crate::service::LookupService`].
#[async_trait]
pub trait Enricher<R>: Send + Sync {
    /// Augment `record`; must not fail. `parent` is the lookup's span.
    async fn enrich(&self, record: R, parent: Option<SpanId>) -> R;
}
