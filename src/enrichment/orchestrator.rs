//! Drives the order → customer enrichment and its telemetry.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::client::{EnrichmentOutcome, FailureKind, RemoteCustomerClient};
use crate::domain::Order;
use crate::enrichment::Enricher;
use crate::observability::{
    attributes, ExceptionRecord, Measurements, SpanGuard, SpanId, SpanKind, Telemetry,
};
use crate::resilience::isolate;

pub const ENRICHMENT_SPAN: &str = "customer.enrichment";
pub const ENRICHMENT_DURATION: &str = "customer.enrichment.duration";
const OPERATION: &str = "customer_enrichment";

pub struct EnrichmentOrchestrator {
    client: Arc<dyn RemoteCustomerClient>,
    telemetry: Telemetry,
}

impl EnrichmentOrchestrator {
    pub fn new(client: Arc<dyn RemoteCustomerClient>, telemetry: Telemetry) -> Self {
        Self { client, telemetry }
    }

    /// Attach the order's customer if the customer service provides one.
    ///
    /// Never fails: every outcome, including a panic inside the client or
    /// while reporting the outcome, returns the order.
    pub async fn enrich(&self, order: Order, parent: Option<SpanId>) -> Order {
        let customer_id = order.customer_id().to_string();
        let url = self.client.endpoint(&customer_id);

        let mut span = self
            .telemetry
            .span(ENRICHMENT_SPAN)
            .kind(SpanKind::Client)
            .parent(parent)
            .attribute("order.id", order.order_id())
            .attribute("customer.id", customer_id.as_str())
            .attribute("operation", OPERATION)
            .attribute("peer.service", self.client.peer_service())
            .attribute("http.url", url.as_str())
            .attribute("http.method", "GET")
            .start();
        span.add_event(
            "http.request.start",
            attributes([("http.url", url.as_str()), ("http.method", "GET")]),
        );

        let started = Instant::now();
        let fallback = order.clone();
        let enriched = isolate(async {
            let outcome = self.client.fetch(&customer_id).await;
            self.apply(order, outcome, &mut span)
        })
        .await;

        let order = match enriched {
            Ok(order) => order,
            Err(fault) => {
                let outcome =
                    EnrichmentOutcome::failure(FailureKind::Unexpected, fault.message, started.elapsed());
                self.apply(fallback, outcome, &mut span)
            }
        };
        span.end();
        order
    }

    fn apply(&self, order: Order, outcome: EnrichmentOutcome, span: &mut SpanGuard<'_>) -> Order {
        let ids = attributes([("orderId", order.order_id()), ("customerId", order.customer_id())]);
        let duration_ms = outcome.duration_ms();
        let mut measurements = Measurements::new();
        measurements.insert("enrichmentDuration".to_string(), duration_ms);

        let mut metric_tags = attributes([("operation", OPERATION), ("outcome", outcome.outcome_label())]);

        match outcome {
            EnrichmentOutcome::Success { customer, .. } => {
                self.telemetry
                    .record_event_with("CustomerEnrichmentSuccess", ids, measurements);
                self.telemetry
                    .record_metric(ENRICHMENT_DURATION, duration_ms, metric_tags);
                span.succeed();
                span.add_event(
                    "customer.enrichment.success",
                    attributes([
                        ("customer.name", customer.full_name().as_str()),
                        ("duration.ms", format_ms(duration_ms).as_str()),
                    ]),
                );
                tracing::info!(
                    order_id = order.order_id(),
                    customer = %customer.full_name(),
                    duration_ms,
                    "Order enriched with customer data"
                );
                order.with_customer(customer)
            }
            EnrichmentOutcome::EmptyResponse { .. } => {
                self.telemetry
                    .record_event_with("CustomerEnrichmentEmpty", ids, measurements);
                metric_tags.insert("error.type".to_string(), "empty_response".to_string());
                self.telemetry
                    .record_metric(ENRICHMENT_DURATION, duration_ms, metric_tags);
                span.add_event(
                    "customer.enrichment.empty_response",
                    attributes([("duration.ms", format_ms(duration_ms).as_str())]),
                );
                span.succeed();
                tracing::warn!(
                    order_id = order.order_id(),
                    "Customer service returned no customer, returning order without customer data"
                );
                order
            }
            EnrichmentOutcome::Failure { kind, detail, .. } => {
                let mut event_attributes = ids.clone();
                event_attributes.insert("errorKind".to_string(), kind.as_str().to_string());
                self.telemetry
                    .record_event_with("CustomerEnrichmentFailure", event_attributes, measurements);
                metric_tags.insert("error.type".to_string(), kind.as_str().to_string());
                self.telemetry
                    .record_metric(ENRICHMENT_DURATION, duration_ms, metric_tags);
                self.telemetry.record_exception(
                    ExceptionRecord::new(kind.as_str(), detail.as_str())
                        .in_span(span.id())
                        .with_attributes(ids),
                );
                span.fail(kind.as_str(), detail.as_str());
                tracing::warn!(
                    order_id = order.order_id(),
                    error_kind = %kind,
                    error = %detail,
                    "Customer enrichment failed, returning order without customer data"
                );
                order
            }
        }
    }
}

fn format_ms(duration_ms: f64) -> String {
    format!("{duration_ms:.0}")
}

#[async_trait]
impl Enricher<Order> for EnrichmentOrchestrator {
    async fn enrich(&self, record: Order, parent: Option<SpanId>) -> Order {
        EnrichmentOrchestrator::enrich(self, record, parent).await
    }
}

impl std::fmt::Debug for EnrichmentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentOrchestrator")
            .field("peer_service", &self.client.peer_service())
            .field("telemetry", &self.telemetry)
            .finish()
    }
}
