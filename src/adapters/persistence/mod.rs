//! Store-agnostic persistence: the record mapper and the optimistic
//! repository built on the [`SessionStore`](crate::ports::SessionStore) port.

mod mapper;
mod repository;

pub use mapper::{category_index_key, category_index_sort_key, PersistedSession, SessionMapper};
pub use repository::StoreSessionRepository;
