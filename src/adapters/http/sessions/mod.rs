//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    BookSessionRequest, BookingResponse, CreateSessionRequest, ErrorResponse,
    SearchSessionsParams, SessionListResponse, SessionResponse,
};
pub use handlers::{BookingApiError, SessionsAppState};
pub use routes::{api_router, session_routes};
