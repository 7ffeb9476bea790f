//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use order_enrichment::client::HttpCustomerClient;
use order_enrichment::config::CustomerServiceConfig;
use order_enrichment::domain::{Customer, CustomerStatus, Order};
use order_enrichment::enrichment::EnrichmentOrchestrator;
use order_enrichment::http::build_router;
use order_enrichment::observability::{MetricsSink, RecordingSink, Telemetry, TelemetrySink};
use order_enrichment::service::{CustomerLookupService, LookupService, OrderLookupService};
use order_enrichment::store::{seed, InMemoryStore};

/// Telemetry wired to a recording sink and a metrics sink, both readable
/// after the fact.
pub struct Harness {
    pub recording: Arc<RecordingSink>,
    pub metrics: Arc<MetricsSink>,
    pub telemetry: Telemetry,
}

impl Harness {
    pub fn new(service: &str) -> Self {
        let recording = Arc::new(RecordingSink::new());
        let metrics = Arc::new(MetricsSink::new(service));
        let sinks: Vec<Arc<dyn TelemetrySink>> = vec![recording.clone(), metrics.clone()];
        Self {
            recording,
            metrics,
            telemetry: Telemetry::new(sinks),
        }
    }
}

/// JSON body the customer service would return for customer 123.
pub fn customer_json(id: &str) -> String {
    let customer = Customer::new(id, "John", "Doe", "john.doe@example.com", CustomerStatus::Active);
    serde_json::to_string(&customer).unwrap()
}

/// Start a programmable backend on an ephemeral port. `f` receives the
/// request path and returns `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let path = read_request_path(&mut socket).await;
                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that always answers with the same status and body.
pub async fn start_mock_backend(status: u16, body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (status, body.to_string()) }).await
}

async fn read_request_path(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string()
}

/// Address that refuses connections.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Serve `router` on an ephemeral port.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Customer lookup service over the seed data, without store latency.
pub fn customer_service(telemetry: Telemetry) -> CustomerLookupService {
    let store = InMemoryStore::new(seed::seed_customers(), Duration::ZERO);
    LookupService::new(Arc::new(store), telemetry)
}

/// Order lookup service over the seed data, enriching from `customer_base`.
pub fn order_service(customer_base: SocketAddr, timeout_ms: u64, telemetry: Telemetry) -> OrderLookupService {
    let orders: Vec<Order> = seed::seed_orders().unwrap();
    let store = InMemoryStore::new(orders, Duration::ZERO);
    let client = HttpCustomerClient::new(&CustomerServiceConfig {
        base_url: format!("http://{customer_base}"),
        timeout_ms,
        connect_timeout_ms: 200,
    })
    .unwrap();
    let enricher = EnrichmentOrchestrator::new(Arc::new(client), telemetry.clone());
    LookupService::new(Arc::new(store), telemetry).with_enricher(Arc::new(enricher))
}

/// Real customer service over HTTP.
pub async fn start_customer_service(harness: &Harness) -> SocketAddr {
    let service = Arc::new(customer_service(harness.telemetry.clone()));
    spawn_router(build_router(service, "customer-service", Duration::from_secs(5))).await
}

/// Real order service over HTTP, enriching from `customer_base`.
pub async fn start_order_service(customer_base: SocketAddr, harness: &Harness) -> SocketAddr {
    let service = Arc::new(order_service(customer_base, 2000, harness.telemetry.clone()));
    spawn_router(build_router(service, "order-service", Duration::from_secs(5))).await
}
