//! Booking command and query handlers.

mod book_session;
mod create_session;
mod get_session;
mod search_sessions;
mod views;

pub use book_session::{BookSessionCommand, BookSessionHandler};
pub use create_session::{CreateSessionCommand, CreateSessionHandler};
pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use search_sessions::{SearchSessionsHandler, SearchSessionsQuery};
pub use views::{BookingReceipt, SessionView};
