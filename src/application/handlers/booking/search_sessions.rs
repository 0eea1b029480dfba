//! SearchSessionsHandler - Query handler for listing sessions by category.

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::booking::BookingError;
use crate::ports::{CategoryFilter, SessionRepository};

use super::SessionView;

/// Query to list sessions, optionally narrowed to one category.
#[derive(Debug, Clone, Default)]
pub struct SearchSessionsQuery {
    pub filter: CategoryFilter,
}

/// Handler for searching sessions.
pub struct SearchSessionsHandler {
    repository: Arc<dyn SessionRepository>,
}

impl SearchSessionsHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Returns matching sessions ordered by date, then start time.
    pub async fn handle(&self, query: SearchSessionsQuery) -> Result<Vec<SessionView>, BookingError> {
        let sessions = self
            .repository
            .find_by_category(query.filter)
            .await
            .map_err(|err| {
                error!(filter = %query.filter, error = %err, "Session search failed");
                err
            })?;

        debug!(filter = %query.filter, count = sessions.len(), "Session search");
        Ok(sessions
            .iter()
            .map(|found| SessionView::from(&found.session))
            .collect())
    }
}
