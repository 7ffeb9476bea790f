//! Order service.
//!
//! Serves `GET /api/orders/{id}`, enriching each found order with its
//! customer from the customer service.
//!
//! ```text
//!   client ──▶ http ──▶ LookupService<Order> ──▶ InMemoryStore
//!                              │
//!                              ▼
//!                   EnrichmentOrchestrator ──▶ customer-service (HTTP)
//!
//!   every step ──▶ Telemetry ──▶ { events, metrics, tracing }
//! ```

use std::path::PathBuf;

use clap::Parser;

use order_enrichment::config::{loader, CliOverrides, ServiceConfig};
use order_enrichment::lifecycle;
use order_enrichment::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "order-service")]
#[command(about = "Order lookup service with customer enrichment", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let base = match &args.config {
        Some(path) => loader::read_config(path)?,
        None => ServiceConfig::default(),
    };
    let cli = CliOverrides {
        bind_address: args.bind,
    };
    let config = loader::finalize(base, &cli)?;

    init_logging(&config.observability)?;
    tracing::info!(
        service = %config.observability.service_name,
        bind_address = %config.listener.bind_address,
        customer_service = %config.customer_service.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    lifecycle::install_metrics_exporter(&config.observability);
    let telemetry = lifecycle::build_telemetry(&config.observability);
    let service = lifecycle::build_order_service(&config, telemetry)?;

    lifecycle::serve(&config, service).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
