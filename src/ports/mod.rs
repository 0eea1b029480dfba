//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Key-value store primitives (partition reads, index
//!   queries, conditional writes)
//! - `SessionRepository` - Aggregate load/save with optimistic concurrency

mod session_repository;
mod session_store;

pub use session_repository::{CategoryFilter, SessionRepository, VersionedSession};
pub use session_store::{
    BookingRecord, SessionRecord, SessionStore, StoreError, StoredItem, VersionBump, METADATA_SK,
};
