//! Booking error taxonomy.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | NotFound | 404 |
//! | AlreadyExists | 409 |
//! | CapacityExceeded | 409 |
//! | DuplicateParticipant | 409 |
//! | ConcurrentModification | 409 |
//! | InvariantViolation | 422 |
//! | DataIntegrity | 500 |
//! | Store | 500 |

use std::fmt;

use crate::domain::foundation::{Email, ErrorCode, SessionId, ValidationError};
use crate::ports::StoreError;

/// Where a duplicate participant was caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedBy {
    /// The in-memory roster already held the email.
    Aggregate,
    /// The store's exists-check on the booking key failed.
    Store,
}

impl fmt::Display for DetectedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedBy::Aggregate => write!(f, "aggregate"),
            DetectedBy::Store => write!(f, "store"),
        }
    }
}

/// Stored state that cannot be turned back into a valid aggregate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataIntegrityError {
    #[error("Booking count mismatch for {session_id}: record says {recorded}, found {loaded} bookings")]
    BookingCountMismatch {
        session_id: SessionId,
        recorded: u32,
        loaded: usize,
    },

    #[error("Corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },
}

impl DataIntegrityError {
    pub fn corrupt(key: impl Into<String>, reason: impl fmt::Display) -> Self {
        DataIntegrityError::CorruptRecord {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Every way reading, booking or saving a session can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Session {session_id} is full (max {max_spots} spots)")]
    CapacityExceeded { session_id: SessionId, max_spots: u32 },

    #[error("{email} is already booked on {session_id}")]
    DuplicateParticipant {
        email: Email,
        session_id: SessionId,
        detected_by: DetectedBy,
    },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),

    #[error("Session {session_id} was modified concurrently (expected version {expected_version})")]
    ConcurrentModification {
        session_id: SessionId,
        expected_version: u64,
    },

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn invariant(message: impl Into<String>) -> Self {
        BookingError::InvariantViolation(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::Validation(err) => ErrorCode::from(err),
            BookingError::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            BookingError::DuplicateParticipant { .. } => ErrorCode::DuplicateParticipant,
            BookingError::InvariantViolation(_) => ErrorCode::InvariantViolation,
            BookingError::NotFound(_) => ErrorCode::SessionNotFound,
            BookingError::AlreadyExists(_) => ErrorCode::SessionExists,
            BookingError::ConcurrentModification { .. } => ErrorCode::ConcurrentModification,
            BookingError::DataIntegrity(_) => ErrorCode::DataIntegrity,
            BookingError::Store(_) => ErrorCode::DatabaseError,
        }
    }

    /// True when re-reading the session and trying again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::ConcurrentModification { .. })
    }
}
