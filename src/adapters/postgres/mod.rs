//! PostgreSQL adapters - Database implementations for store ports.
//!
//! - `PostgresSessionStore` - Session partitions in a single `session_items` table

mod session_store;

pub use session_store::PostgresSessionStore;
