//! GetSessionHandler - Query handler for retrieving one session.

use std::sync::Arc;

use tracing::error;

use crate::domain::booking::BookingError;
use crate::domain::foundation::SessionId;
use crate::ports::SessionRepository;

use super::SessionView;

/// Query to get a session by identity.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
}

/// Handler for retrieving session details.
pub struct GetSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl GetSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<SessionView, BookingError> {
        let found = self
            .repository
            .find_by_id(&query.session_id)
            .await
            .map_err(|err| {
                error!(session_id = %query.session_id, error = %err, "Failed to load session");
                err
            })?
            .ok_or(BookingError::NotFound(query.session_id))?;

        Ok(SessionView::from(&found.session))
    }
}
