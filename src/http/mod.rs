//! HTTP surface of the lookup services.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request span)
//!     → handlers.rs (lookup / health)
//!     → service::LookupService
//!     → response.rs (record JSON or error body)
//! ```
//!
//! # Routes
//! - `GET /api/orders/{id}`, `GET /api/orders/health`
//! - `GET /api/customers/{id}`, `GET /api/customers/health`

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::{build_router, HttpServer};
