//! Record storage subsystem.
//!
//! # Data Flow
//! ```text
//! seed.rs (fixture records)
//!     → InMemoryStore::new (indexed by id, never mutated again)
//!     → RecordStore::lookup (simulated round trip, then a copy of the record)
//! ```
//!
//! # Design Decisions
//! - Read-only after construction, so concurrent lookups need no locking
//! - "Not found" is `None`, never an error
//! - Lookups return owned copies; callers cannot reach the stored record

pub mod memory;
pub mod seed;

pub use memory::InMemoryStore;

use async_trait::async_trait;

/// Key → record lookup.
#[async_trait]
pub trait RecordStore<R>: Send + Sync {
    async fn lookup(&self, id: &str) -> Option<R>;
}
