//! Request-scoped lookup with telemetry.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::Record;
use crate::enrichment::Enricher;
use crate::observability::{
    attributes, Attributes, ExceptionRecord, SpanGuard, SpanKind, Telemetry,
};
use crate::resilience::isolate;
use crate::service::LookupError;
use crate::store::RecordStore;

/// Every telemetry name one entity's lookup flow emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryNames {
    pub request: String,
    pub invalid: String,
    pub not_found: String,
    pub found: String,
    pub span: String,
    pub found_span_event: String,
    pub duration_metric: String,
    /// Attribute key carrying the id, e.g. `orderId`.
    pub id_attribute: String,
}

impl TelemetryNames {
    pub fn for_entity(entity: &str) -> Self {
        let lower = entity.to_ascii_lowercase();
        let mut chars = entity.chars();
        let camel: String = chars
            .next()
            .map(|first| first.to_ascii_lowercase().to_string() + chars.as_str())
            .unwrap_or_default();

        Self {
            request: format!("{entity}Request"),
            invalid: format!("Invalid{entity}Request"),
            not_found: format!("{entity}NotFound"),
            found: format!("{entity}Found"),
            span: format!("{lower}.processing"),
            found_span_event: format!("{lower}.found"),
            duration_metric: format!("{lower}.processing.duration"),
            id_attribute: format!("{camel}Id"),
        }
    }
}

/// Looks up one kind of record and reports the flow to telemetry.
pub struct LookupService<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    enricher: Option<Arc<dyn Enricher<R>>>,
    telemetry: Telemetry,
    names: TelemetryNames,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> LookupService<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>, telemetry: Telemetry) -> Self {
        Self {
            store,
            enricher: None,
            telemetry,
            names: TelemetryNames::for_entity(R::ENTITY),
            _record: PhantomData,
        }
    }

    /// Run `enricher` on every found record before returning it.
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher<R>>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn names(&self) -> &TelemetryNames {
        &self.names
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub async fn get(&self, id: &str) -> Result<R, LookupError> {
        let names = &self.names;
        self.telemetry
            .record_event(&names.request, self.id_attributes(id));

        if id.trim().is_empty() {
            tracing::warn!(entity = R::ENTITY, "Rejected lookup with blank id");
            self.telemetry
                .record_event(&names.invalid, self.id_attributes(id));
            return Err(LookupError::Validation { entity: R::ENTITY });
        }

        let started = Instant::now();
        let mut span = self
            .telemetry
            .span(names.span.as_str())
            .kind(SpanKind::Internal)
            .attribute(&format!("{}.id", R::ENTITY.to_ascii_lowercase()), id)
            .start();

        let result = match isolate(self.process(id, &mut span)).await {
            Ok(result) => result,
            Err(fault) => {
                tracing::error!(entity = R::ENTITY, id, error = %fault, "Unexpected error during lookup");
                self.telemetry.record_exception(
                    ExceptionRecord::new("unexpected_error", fault.message.as_str())
                        .in_span(span.id())
                        .with_attributes(self.id_attributes(id)),
                );
                span.fail("unexpected_error", fault.message.as_str());
                Err(LookupError::Unexpected(fault.message))
            }
        };

        self.record_duration(started, &result);
        span.end();
        result
    }

    async fn process(&self, id: &str, span: &mut SpanGuard<'_>) -> Result<R, LookupError> {
        let names = &self.names;

        let Some(record) = self.store.lookup(id).await else {
            tracing::info!(entity = R::ENTITY, id, "Record not found");
            self.telemetry
                .record_event(&names.not_found, self.id_attributes(id));
            span.fail("not_found", format!("{} not found", R::ENTITY));
            return Err(LookupError::NotFound {
                entity: R::ENTITY,
                id: id.to_string(),
            });
        };

        let mut found = self.id_attributes(id);
        found.insert("status".to_string(), record.status_label().to_string());
        span.add_event(&names.found_span_event, found);
        self.telemetry.record_event_with(
            &names.found,
            record.found_attributes(),
            record.found_measurements(),
        );

        let record = match &self.enricher {
            Some(enricher) => enricher.enrich(record, Some(span.id())).await,
            None => record,
        };

        span.succeed();
        tracing::info!(entity = R::ENTITY, id, "Lookup succeeded");
        Ok(record)
    }

    fn record_duration(&self, started: Instant, result: &Result<R, LookupError>) {
        let mut tags = match result {
            Ok(_) => attributes([("outcome", "success")]),
            Err(e) => attributes([("outcome", "failure"), ("failure_type", e.kind())]),
        };
        tags.insert(
            "operation".to_string(),
            format!("{}_lookup", R::ENTITY.to_ascii_lowercase()),
        );
        self.telemetry.record_metric(
            &self.names.duration_metric,
            started.elapsed().as_secs_f64() * 1000.0,
            tags,
        );
    }

    fn id_attributes(&self, id: &str) -> Attributes {
        attributes([(self.names.id_attribute.as_str(), id)])
    }
}

impl<R: Record> std::fmt::Debug for LookupService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupService")
            .field("entity", &R::ENTITY)
            .field("enriched", &self.enricher.is_some())
            .field("telemetry", &self.telemetry)
            .finish()
    }
}
