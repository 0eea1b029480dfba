//! Adapters - Implementations of port interfaces.
//!
//! - `persistence` - Record mapping and the repository over any [`SessionStore`](crate::ports::SessionStore)
//! - `memory` - In-process store for tests and local runs
//! - `postgres` - PostgreSQL store
//! - `http` - Axum REST API

pub mod http;
pub mod memory;
pub mod persistence;
pub mod postgres;

pub use memory::InMemorySessionStore;
pub use persistence::StoreSessionRepository;
pub use postgres::PostgresSessionStore;
