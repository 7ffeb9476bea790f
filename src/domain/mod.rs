//! Domain model.
//!
//! # Data Flow
//! ```text
//! seed fixtures (store/seed.rs)
//!     → Order / Customer (immutable after construction)
//!     → RecordStore (read-only lookup, hands out copies)
//!     → LookupService (telemetry + optional enrichment)
//!     → JSON response
//! ```
//!
//! # Design Decisions
//! - Money is fixed-point (`rust_decimal`), never floating point
//! - `Order::total_amount` is derived once in the constructor and has no setter
//! - A fetched `Customer` is attached by value; nothing shares it mutably

pub mod customer;
pub mod order;
pub mod timestamp;

pub use customer::{Customer, CustomerStatus};
pub use order::{Order, OrderStatus};

use serde::Serialize;
use thiserror::Error;

use crate::observability::{Attributes, Measurements};

/// Errors raised while constructing domain records.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    /// Quantity must be a positive integer.
    #[error("Order quantity must be positive, got {0}")]
    InvalidQuantity(u32),

    /// Unit price must be non-negative.
    #[error("Unit price must be non-negative, got {0}")]
    NegativePrice(rust_decimal::Decimal),

    /// Quantity times unit price does not fit in a decimal.
    #[error("Order total overflows for {quantity} x {unit_price}")]
    TotalOverflow {
        quantity: u32,
        unit_price: rust_decimal::Decimal,
    },
}

/// A record served by a [`crate::service::LookupService`].
///
/// The entity name drives every telemetry name the lookup flow emits:
/// `"{ENTITY}Request"`, `"Invalid{ENTITY}Request"`, `"{ENTITY}NotFound"`,
/// `"{ENTITY}Found"` and the `"{entity}.processing"` span.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// Capitalised entity name, e.g. `"Order"`.
    const ENTITY: &'static str;

    /// Key used by the record store.
    fn id(&self) -> &str;

    /// Stable label of the record's status enumeration.
    fn status_label(&self) -> &'static str;

    /// Attributes attached to the `"{ENTITY}Found"` event.
    fn found_attributes(&self) -> Attributes;

    /// Measurements attached to the `"{ENTITY}Found"` event.
    fn found_measurements(&self) -> Measurements {
        Measurements::new()
    }
}
