//! CreateSessionHandler - Command handler for scheduling a new session.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::booking::{BookingError, Session};
use crate::domain::foundation::{SessionId, SessionType, ValidationError, Weekday};
use crate::ports::SessionRepository;

use super::SessionView;

/// Command to create a session with no bookings.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub session_id: SessionId,
    pub session_type: SessionType,
    pub max_spots: u32,
}

/// Handler for creating sessions.
pub struct CreateSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl CreateSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Persists the session at version 0.
    ///
    /// # Errors
    ///
    /// - `Validation` if the weekday does not match the date or `max_spots` is zero
    /// - `AlreadyExists` if a session with this identity exists
    pub async fn handle(&self, cmd: CreateSessionCommand) -> Result<SessionView, BookingError> {
        let id = cmd.session_id;
        let actual = Weekday::of(id.date());
        if actual != id.weekday() {
            return Err(ValidationError::invalid_format(
                "weekday",
                format!("{} falls on {}, not {}", id.date(), actual, id.weekday()),
            )
            .into());
        }

        let session = Session::new(id, cmd.session_type, cmd.max_spots)?;

        match self.repository.create(&session).await {
            Ok(()) => {
                info!(
                    session_id = %id,
                    session_type = %cmd.session_type,
                    max_spots = cmd.max_spots,
                    "Session created"
                );
                Ok(SessionView::from(&session))
            }
            Err(err @ BookingError::AlreadyExists(_)) => {
                warn!(session_id = %id, "Session already exists");
                Err(err)
            }
            Err(err) => {
                error!(session_id = %id, error = %err, "Failed to create session");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionStore;
    use crate::adapters::persistence::StoreSessionRepository;
    use crate::domain::foundation::{Category, StartSlot};

    fn command(date: &str, weekday: Weekday, max_spots: u32) -> CreateSessionCommand {
        CreateSessionCommand {
            session_id: SessionId::from_parts(date, weekday, StartSlot::T2030).unwrap(),
            session_type: SessionType::new(Category::Salsa, Some(3)).unwrap(),
            max_spots,
        }
    }

    fn handler() -> (CreateSessionHandler, Arc<StoreSessionRepository>) {
        let repo = Arc::new(StoreSessionRepository::new(Arc::new(InMemorySessionStore::new())));
        (CreateSessionHandler::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn creates_session_at_version_zero() {
        let (handler, repo) = handler();

        let view = handler
            .handle(command("2024-12-09", Weekday::Mon, 20))
            .await
            .unwrap();
        assert_eq!(view.start_time, "20:30");
        assert_eq!(view.spots_remaining, 20);

        let stored = repo.find_by_id(&view.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 0);
        assert_eq!(stored.session.max_spots(), 20);
    }

    #[tokio::test]
    async fn duplicate_identity_is_already_exists() {
        let (handler, _) = handler();
        handler
            .handle(command("2024-12-09", Weekday::Mon, 20))
            .await
            .unwrap();

        let err = handler
            .handle(command("2024-12-09", Weekday::Mon, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn weekday_must_match_date() {
        let (handler, _) = handler();
        let err = handler
            .handle(command("2024-12-09", Weekday::Tue, 20))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_spots_is_rejected() {
        let (handler, _) = handler();
        let err = handler
            .handle(command("2024-12-09", Weekday::Mon, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::OutOfRange { .. })
        ));
    }
}
