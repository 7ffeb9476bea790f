//! Lookup and health handlers, generic over the served record.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::domain::Record;
use crate::http::request::request_id;
use crate::observability::attributes;
use crate::service::{LookupError, LookupService};

/// State shared by one service's handlers.
pub struct AppState<R: Record> {
    pub service: Arc<LookupService<R>>,
    pub service_name: Arc<str>,
}

impl<R: Record> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            service_name: self.service_name.clone(),
        }
    }
}

/// `GET /api/{entity}s/{id}`.
pub async fn get_record<R: Record>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<R>, LookupError> {
    tracing::debug!(request_id = request_id(&headers), entity = R::ENTITY, id = %id, "Lookup request");
    state.service.get(&id).await.map(Json)
}

/// `GET /api/{entity}s/`: a request with an empty id.
pub async fn get_blank<R: Record>(State(state): State<AppState<R>>) -> Result<Json<R>, LookupError> {
    state.service.get("").await.map(Json)
}

/// `GET /api/{entity}s/health`.
pub async fn health<R: Record>(State(state): State<AppState<R>>) -> String {
    state
        .service
        .telemetry()
        .record_event("HealthCheck", attributes([("service", &*state.service_name)]));
    format!("{} Service is UP", R::ENTITY)
}
