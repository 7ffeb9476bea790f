//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the telemetry fan-out from observability config
//! - Seed the in-memory stores
//! - Wire the customer client and enricher into the order service
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Events and metrics sinks are always present; the tracing sink is
//!   active only when a connection string is configured

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::client::{ClientError, HttpCustomerClient};
use crate::config::{ObservabilityConfig, ServiceConfig};
use crate::domain::{DomainError, Record};
use crate::enrichment::EnrichmentOrchestrator;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics::init_metrics;
use crate::observability::{
    EventSink, MetricsSink, NoopSink, Telemetry, TelemetrySink, TracingSink,
};
use crate::service::{CustomerLookupService, LookupService, OrderLookupService};
use crate::store::{seed, InMemoryStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("customer client: {0}")]
    Client(#[from] ClientError),

    #[error("seed data: {0}")]
    Seed(#[from] DomainError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Events, metrics and tracing sinks for one service.
pub fn build_telemetry(config: &ObservabilityConfig) -> Telemetry {
    let service = config.service_name.as_str();
    let tracing_sink: Arc<dyn TelemetrySink> = match config.connection_string.as_deref() {
        Some(connection_string) => {
            let sink = TracingSink::new(service, connection_string);
            tracing::info!(
                service,
                endpoint = sink.endpoint().unwrap_or("default"),
                "Tracing sink enabled"
            );
            Arc::new(sink)
        }
        None => {
            tracing::info!(service, "No telemetry connection string; tracing sink disabled");
            Arc::new(NoopSink)
        }
    };

    Telemetry::new(vec![
        Arc::new(EventSink::new(service)),
        Arc::new(MetricsSink::new(service)),
        tracing_sink,
    ])
}

/// Order lookup service with customer enrichment.
pub fn build_order_service(
    config: &ServiceConfig,
    telemetry: Telemetry,
) -> Result<OrderLookupService, StartupError> {
    let orders = seed::seed_orders()?;
    let store = InMemoryStore::new(orders, Duration::from_millis(config.store.order_latency_ms));
    tracing::info!(orders = store.len(), "Order store seeded");

    let client = HttpCustomerClient::new(&config.customer_service)?;
    tracing::info!(
        base_url = %config.customer_service.base_url,
        timeout_ms = client.timeout().as_millis() as u64,
        "Customer client ready"
    );

    let enricher = EnrichmentOrchestrator::new(Arc::new(client), telemetry.clone());
    Ok(OrderLookupService::new(Arc::new(store), telemetry).with_enricher(Arc::new(enricher)))
}

/// Customer lookup service.
pub fn build_customer_service(config: &ServiceConfig, telemetry: Telemetry) -> CustomerLookupService {
    let store = InMemoryStore::new(
        seed::seed_customers(),
        Duration::from_millis(config.store.customer_latency_ms),
    );
    tracing::info!(customers = store.len(), "Customer store seeded");
    CustomerLookupService::new(Arc::new(store), telemetry)
}

/// Install the Prometheus exporter if enabled. Failures are logged, not
/// fatal: lookups keep working without a scrape endpoint.
pub fn install_metrics_exporter(config: &ObservabilityConfig) {
    if !config.metrics_enabled {
        return;
    }
    match config.metrics_address.parse() {
        Ok(addr) => {
            if let Err(e) = init_metrics(addr) {
                tracing::error!(error = %e, "Failed to install metrics exporter");
            }
        }
        Err(_) => tracing::error!(
            metrics_address = %config.metrics_address,
            "Failed to parse metrics address"
        ),
    }
}

/// Bind the listener and serve `service` until SIGINT/SIGTERM.
pub async fn serve<R: Record>(
    config: &ServiceConfig,
    service: LookupService<R>,
) -> Result<(), StartupError> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        service = %config.observability.service_name,
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(service));
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let finished_early = tokio::select! {
        joined = &mut server_task => Some(joined),
        _ = signals::wait_for_signal(&shutdown) => None,
    };
    let joined = match finished_early {
        Some(joined) => joined,
        None => server_task.await,
    };

    match joined {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "Server task failed"),
    }
    Ok(())
}
