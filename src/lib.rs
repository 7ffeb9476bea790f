//! Order lookup with remote customer enrichment and uniform telemetry.

pub mod client;
pub mod config;
pub mod domain;
pub mod enrichment;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use domain::{Customer, Order, Record};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Telemetry;
pub use service::{LookupError, LookupService};
