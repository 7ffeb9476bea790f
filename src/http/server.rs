//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router for one lookup service
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::domain::Record;
use crate::http::handlers::{self, AppState};
use crate::http::request::{make_request_span, MakeRequestUuid};
use crate::service::LookupService;

/// HTTP server for one lookup service.
pub struct HttpServer {
    router: Router,
    name: String,
}

impl HttpServer {
    /// Serve `service` under `/api/{entity}s`.
    pub fn new<R: Record>(config: &ServiceConfig, service: Arc<LookupService<R>>) -> Self {
        let name = config.observability.service_name.clone();
        let router = build_router(
            service,
            &name,
            Duration::from_secs(config.timeouts.request_secs),
        );
        Self { router, name }
    }

    /// The fully layered router, e.g. for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener, until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(service = %self.name, address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!(service = %self.name, "HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router<R: Record>(
    service: Arc<LookupService<R>>,
    service_name: &str,
    request_timeout: Duration,
) -> Router {
    let base = format!("/api/{}s", R::ENTITY.to_ascii_lowercase());
    let state = AppState {
        service,
        service_name: Arc::from(service_name),
    };

    Router::new()
        .route(&format!("{base}/health"), get(handlers::health::<R>))
        .route(&format!("{base}/"), get(handlers::get_blank::<R>))
        .route(&format!("{base}/{{id}}"), get(handlers::get_record::<R>))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(request_timeout)),
        )
}
