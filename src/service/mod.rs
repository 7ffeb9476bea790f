//! Lookup service subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → LookupService::get(id)
//!         → "{Entity}Request" event
//!         → blank id? "Invalid{Entity}Request", Validation error, no span
//!         → "{entity}.processing" span opened
//!         → RecordStore::lookup (fault-isolated together with enrichment)
//!         → not found: "{Entity}NotFound", span failed
//!         → found: "{entity}.found" span event, "{Entity}Found" event,
//!           optional Enricher, span succeeded
//!         → "{entity}.processing.duration" metric, span ended
//!     ← Result<R, LookupError>
//! ```
//!
//! # Design Decisions
//! - One generic service for orders and customers; the entity name drives
//!   every telemetry name
//! - Validation and not-found are typed results, not faults
//! - The span is owned outside the isolated body, so it is ended on every
//!   path including a caught panic

pub mod error;
pub mod lookup;

pub use error::LookupError;
pub use lookup::{LookupService, TelemetryNames};

use crate::domain::{Customer, Order};

pub type OrderLookupService = LookupService<Order>;
pub type CustomerLookupService = LookupService<Customer>;
