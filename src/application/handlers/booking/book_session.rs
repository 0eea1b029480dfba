//! BookSessionHandler - Command handler for booking a spot on a session.
//!
//! Loads the session, lets the aggregate apply the booking rules, and
//! commits with the version it loaded. A conflict is returned to the caller
//! as-is; nothing here retries.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::booking::BookingError;
use crate::domain::foundation::{Email, SessionId};
use crate::ports::{SessionRepository, VersionedSession};

use super::BookingReceipt;

/// Command to book a spot for a participant.
#[derive(Debug, Clone)]
pub struct BookSessionCommand {
    pub session_id: SessionId,
    pub email: Email,
}

/// Handler for booking sessions.
pub struct BookSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl BookSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: BookSessionCommand) -> Result<BookingReceipt, BookingError> {
        self.book(&cmd).await.map_err(|err| {
            log_failure(&cmd, &err);
            err
        })
    }

    async fn book(&self, cmd: &BookSessionCommand) -> Result<BookingReceipt, BookingError> {
        // 1. Load the full roster and the version it was read at
        let VersionedSession {
            mut session,
            version,
        } = self
            .repository
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or(BookingError::NotFound(cmd.session_id))?;

        // 2. Apply the booking rules in memory
        let booking = session.book(cmd.email.clone())?;

        // 3. Commit against the loaded version
        let new_version = self.repository.save(&session, version).await?;

        info!(
            session_id = %cmd.session_id,
            email = %cmd.email,
            version = new_version,
            spots_remaining = session.spots_remaining(),
            "Booking committed"
        );

        Ok(BookingReceipt::new(cmd.session_id, &booking))
    }
}

fn log_failure(cmd: &BookSessionCommand, err: &BookingError) {
    match err {
        BookingError::DataIntegrity(_) | BookingError::Store(_) => error!(
            session_id = %cmd.session_id,
            email = %cmd.email,
            code = %err.code(),
            error = %err,
            "Booking failed"
        ),
        BookingError::ConcurrentModification { .. } | BookingError::DuplicateParticipant { .. } => {
            warn!(
                session_id = %cmd.session_id,
                email = %cmd.email,
                code = %err.code(),
                retryable = err.is_retryable(),
                "Booking conflict"
            )
        }
        _ => debug!(
            session_id = %cmd.session_id,
            email = %cmd.email,
            code = %err.code(),
            "Booking rejected"
        ),
    }
}
