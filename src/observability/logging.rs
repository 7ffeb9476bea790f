//! Structured logging.
//!
//! # Design Decisions
//! - `RUST_LOG` wins when set; otherwise the configured level applies to
//!   this crate, tower-http and the `telemetry::*` sink targets
//! - JSON output for production, plain text for development

use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter, Layer,
};

use crate::config::ObservabilityConfig;

/// Targets that follow the configured level.
const LOG_TARGETS: [&str; 3] = ["order_enrichment", "tower_http", "telemetry"];

fn filter_directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set (e.g. called twice).
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let fmt_layer = if config.json_logs {
        fmt_layer.json().flatten_event(true).with_current_span(true).boxed()
    } else {
        fmt_layer.boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}
