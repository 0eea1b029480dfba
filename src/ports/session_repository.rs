//! Session repository port.
//!
//! Loads and saves Session aggregates with optimistic concurrency: every
//! read hands back the version it saw, and every save must present it.
//!
//! # Design
//!
//! - **No retries**: a version conflict is returned to the caller, who
//!   re-reads and starts over
//! - **No business rules**: booking rules live on the aggregate

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::domain::booking::{BookingError, Session};
use crate::domain::foundation::{Category, SessionId, SessionType, ValidationError};

/// A session together with the committed version it was loaded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedSession {
    pub session: Session,
    pub version: u64,
}

impl VersionedSession {
    pub fn new(session: Session, version: u64) -> Self {
        Self { session, version }
    }
}

/// Which categories a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    Any,
    Only(Category),
}

impl CategoryFilter {
    /// Every session type the filter matches, one per index key.
    pub fn session_types(&self) -> Vec<SessionType> {
        match self {
            CategoryFilter::Any => Category::all()
                .iter()
                .flat_map(|category| category.session_types())
                .collect(),
            CategoryFilter::Only(category) => category.session_types(),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::Any => write!(f, "any"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "any" {
            return Ok(CategoryFilter::Any);
        }
        s.parse::<Category>().map(CategoryFilter::Only)
    }
}

/// Repository port for Session aggregate persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session with its full roster.
    ///
    /// Returns `None` if no metadata record exists for `id`.
    ///
    /// # Errors
    ///
    /// - `DataIntegrity` if stored records are inconsistent
    /// - `Store` on store failure
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<VersionedSession>, BookingError>;

    /// Find sessions by category, count-only, ordered by date then start time.
    async fn find_by_category(
        &self,
        filter: CategoryFilter,
    ) -> Result<Vec<VersionedSession>, BookingError>;

    /// Commit a loaded session, returning the new version.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if the stored version is no longer
    ///   `expected_version`
    /// - `DuplicateParticipant` if a new booking already exists in the store
    /// - `Store` on any other store failure
    async fn save(&self, session: &Session, expected_version: u64) -> Result<u64, BookingError>;

    /// Persist a brand new session at version 0.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if a session with the same identity exists
    async fn create(&self, session: &Session) -> Result<(), BookingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SessionRepository) {}
    }

    #[test]
    fn filter_parses_any_and_categories() {
        assert_eq!("any".parse::<CategoryFilter>().unwrap(), CategoryFilter::Any);
        assert_eq!(
            "bachata".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Bachata)
        );
        assert!("tango".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn filter_expands_to_every_index_key() {
        assert_eq!(CategoryFilter::Any.session_types().len(), 6);
        assert_eq!(CategoryFilter::Only(Category::Salsa).session_types().len(), 3);
        assert_eq!(
            CategoryFilter::Only(Category::Reggaeton).session_types().len(),
            1
        );
    }
}
