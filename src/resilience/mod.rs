//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the customer service:
//!     → timeouts.rs (enforce the configured deadline)
//!     → on expiry: Failure(timeout), handled by the enrichment degrade path
//!
//! Enrichment and lookup bodies:
//!     → fault.rs (a panic becomes a Fault at the boundary)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: a failed enrichment degrades to an unenriched order

pub mod fault;
pub mod timeouts;

pub use fault::{isolate, Fault};
pub use timeouts::{with_timeout, TimeoutError};
