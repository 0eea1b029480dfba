//! HTTP handlers for session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::handlers::booking::{
    BookSessionCommand, BookSessionHandler, CreateSessionCommand, CreateSessionHandler,
    GetSessionHandler, GetSessionQuery, SearchSessionsHandler, SearchSessionsQuery,
};
use crate::domain::booking::BookingError;
use crate::domain::foundation::{
    Category, Email, SessionId, SessionType, StartSlot, ValidationError, Weekday,
};
use crate::ports::{CategoryFilter, SessionRepository};

use super::dto::{
    BookSessionRequest, BookingResponse, CreateSessionRequest, ErrorResponse,
    SearchSessionsParams, SessionListResponse, SessionResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for session routes.
#[derive(Clone)]
pub struct SessionsAppState {
    pub repository: Arc<dyn SessionRepository>,
}

impl SessionsAppState {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Create handlers on demand from the shared state.
    pub fn book_session_handler(&self) -> BookSessionHandler {
        BookSessionHandler::new(self.repository.clone())
    }

    pub fn get_session_handler(&self) -> GetSessionHandler {
        GetSessionHandler::new(self.repository.clone())
    }

    pub fn search_sessions_handler(&self) -> SearchSessionsHandler {
        SearchSessionsHandler::new(self.repository.clone())
    }

    pub fn create_session_handler(&self) -> CreateSessionHandler {
        CreateSessionHandler::new(self.repository.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/sessions?type= - List sessions by category
pub async fn search_sessions(
    State(state): State<SessionsAppState>,
    Query(params): Query<SearchSessionsParams>,
) -> Result<impl IntoResponse, BookingApiError> {
    let filter = match params.session_type.as_deref() {
        None => CategoryFilter::Any,
        Some(value) => value.parse::<CategoryFilter>()?,
    };

    let views = state
        .search_sessions_handler()
        .handle(SearchSessionsQuery { filter })
        .await?;

    Ok(Json(SessionListResponse::from(views)))
}

/// GET /api/sessions/:id - Get one session
pub async fn get_session(
    State(state): State<SessionsAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, BookingApiError> {
    let session_id = session_id.parse::<SessionId>()?;

    let view = state
        .get_session_handler()
        .handle(GetSessionQuery { session_id })
        .await?;

    Ok(Json(SessionResponse::from(view)))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions/:id/bookings - Book a spot
pub async fn book_session(
    State(state): State<SessionsAppState>,
    Path(session_id): Path<String>,
    Json(request): Json<BookSessionRequest>,
) -> Result<impl IntoResponse, BookingApiError> {
    let cmd = BookSessionCommand {
        session_id: session_id.parse::<SessionId>()?,
        email: Email::new(request.email)?,
    };

    let receipt = state.book_session_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(receipt))))
}

/// POST /api/sessions - Schedule a new session
pub async fn create_session(
    State(state): State<SessionsAppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, BookingApiError> {
    let session_id = SessionId::from_parts(
        &request.date,
        request.weekday.parse::<Weekday>()?,
        StartSlot::from_clock(&request.start_time)?,
    )?;
    let session_type = SessionType::new(request.session_type.parse::<Category>()?, request.level)?;

    let cmd = CreateSessionCommand {
        session_id,
        session_type,
        max_spots: request.max_spots,
    };

    let view = state.create_session_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(view))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts booking errors to HTTP responses.
#[derive(Debug)]
pub struct BookingApiError(BookingError);

impl From<BookingError> for BookingApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for BookingApiError {
    fn from(err: ValidationError) -> Self {
        Self(BookingError::Validation(err))
    }
}

impl IntoResponse for BookingApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::AlreadyExists(_)
            | BookingError::CapacityExceeded { .. }
            | BookingError::DuplicateParticipant { .. }
            | BookingError::ConcurrentModification { .. } => StatusCode::CONFLICT,
            BookingError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::DataIntegrity(_) | BookingError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let code = self.0.code().to_string();
        let body = match &self.0 {
            BookingError::DataIntegrity(_) | BookingError::Store(_) => {
                ErrorResponse::new(code, "An internal error occurred")
            }
            BookingError::Validation(err) => {
                ErrorResponse::new(code, err.to_string()).with_details(json!({ "field": err.field() }))
            }
            BookingError::ConcurrentModification { .. } => {
                ErrorResponse::new(code, self.0.to_string()).with_details(json!({ "retryable": true }))
            }
            other => ErrorResponse::new(code, other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
