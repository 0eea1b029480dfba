//! Axum router configuration for session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    book_session, create_session, get_session, health, search_sessions, SessionsAppState,
};

/// Create the session API router.
///
/// # Routes
///
/// - `GET /?type=` - List sessions, optionally by category
/// - `POST /` - Schedule a new session
/// - `GET /:id` - Get one session
/// - `POST /:id/bookings` - Book a spot
pub fn session_routes() -> Router<SessionsAppState> {
    Router::new()
        .route("/", get(search_sessions).post(create_session))
        .route("/:id", get(get_session))
        .route("/:id/bookings", post(book_session))
}

/// Create the complete application router, mounted at `/api/sessions`
/// plus `GET /health`.
pub fn api_router(state: SessionsAppState) -> Router {
    Router::new()
        .nest("/api/sessions", session_routes())
        .route("/health", get(health))
        .with_state(state)
}
