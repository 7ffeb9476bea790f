//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both
//! services. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a lookup service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Remote customer service used for order enrichment.
    pub customer_service: CustomerServiceConfig,

    /// Simulated backing-store latency.
    pub store: StoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServiceConfig {
    /// Defaults for the customer service binary: its own port, name and
    /// scrape address so both services can run side by side.
    pub fn customer_service_defaults() -> Self {
        Self {
            listener: ListenerConfig {
                bind_address: "0.0.0.0:8081".to_string(),
            },
            observability: ObservabilityConfig {
                service_name: "customer-service".to_string(),
                metrics_address: "0.0.0.0:9091".to_string(),
                ..ObservabilityConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Remote customer service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CustomerServiceConfig {
    /// Base URL; lookups go to `{base_url}/api/customers/{id}`.
    pub base_url: String,

    /// Upper bound on one fetch, connect included, in milliseconds.
    pub timeout_ms: u64,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for CustomerServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            timeout_ms: 2000,
            connect_timeout_ms: 500,
        }
    }
}

/// Simulated store round trip per lookup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub order_latency_ms: u64,
    pub customer_latency_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            order_latency_ms: 10,
            customer_latency_ms: 200,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to every telemetry signal.
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Telemetry backend connection string. When absent the tracing sink
    /// is a no-op.
    pub connection_string: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "order-service".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
            connection_string: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.customer_service.timeout_ms, 2000);
        assert_eq!(config.store.customer_latency_ms, 200);
        assert!(config.observability.connection_string.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [customer_service]
            base_url = "http://customers.internal:9000"

            [observability]
            connection_string = "InstrumentationKey=abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.customer_service.base_url, "http://customers.internal:9000");
        assert_eq!(config.customer_service.connect_timeout_ms, 500);
        assert_eq!(
            config.observability.connection_string.as_deref(),
            Some("InstrumentationKey=abc")
        );
        assert_eq!(config.observability.service_name, "order-service");
    }

    #[test]
    fn test_customer_service_defaults() {
        let config = ServiceConfig::customer_service_defaults();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8081");
        assert_eq!(config.observability.service_name, "customer-service");
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
