//! Store-backed implementation of SessionRepository.
//!
//! Implements the optimistic write protocol on top of any [`SessionStore`]:
//!
//! 1. Re-read the booking keys already in the partition
//! 2. Compare-and-swap the metadata record on `expected_version`
//! 3. Only after the swap lands, insert each new booking with an
//!    exists-check on `(session, email)`
//!
//! The swap and the inserts are separate atomic operations. Nothing here
//! retries; conflicts go back to the caller as typed errors.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::domain::booking::{BookingError, DetectedBy, Session};
use crate::domain::foundation::SessionId;
use crate::ports::{
    CategoryFilter, SessionRepository, SessionStore, StoreError, StoredItem, VersionBump,
    VersionedSession,
};

use super::mapper::{category_index_key, SessionMapper};

/// SessionRepository over a key-value [`SessionStore`].
#[derive(Clone)]
pub struct StoreSessionRepository {
    store: Arc<dyn SessionStore>,
}

impl StoreSessionRepository {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    async fn durable_booking_keys(&self, pk: &str) -> Result<HashSet<String>, StoreError> {
        let items = self.store.query_partition(pk).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                StoredItem::Booking(record) => Some(record.sk),
                StoredItem::Session(_) => None,
            })
            .collect())
    }

    async fn insert_bookings(
        &self,
        session: &Session,
        skip: &HashSet<String>,
    ) -> Result<(), BookingError> {
        for booking in session
            .bookings()
            .filter(|booking| !skip.contains(booking.email().as_str()))
        {
            let record = SessionMapper::booking_to_record(session.id(), booking);
            match self.store.put_booking_if_absent(&record).await {
                Ok(()) => {}
                Err(StoreError::ConditionFailed) => {
                    return Err(BookingError::DuplicateParticipant {
                        email: booking.email().clone(),
                        session_id: *session.id(),
                        detected_by: DetectedBy::Store,
                    })
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for StoreSessionRepository {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<VersionedSession>, BookingError> {
        let items = self.store.query_partition(&id.to_string()).await?;

        let mut metadata = None;
        let mut bookings = Vec::new();
        for item in items {
            match item {
                StoredItem::Session(record) => metadata = Some(record),
                StoredItem::Booking(record) => bookings.push(record),
            }
        }

        let Some(record) = metadata else {
            return Ok(None);
        };

        // No booking records under a non-zero count loads count-only: the
        // records are still being written, or their insert failed.
        Ok(Some(SessionMapper::to_domain(&record, &bookings)?))
    }

    async fn find_by_category(
        &self,
        filter: CategoryFilter,
    ) -> Result<Vec<VersionedSession>, BookingError> {
        let keys: Vec<String> = filter
            .session_types()
            .iter()
            .map(category_index_key)
            .collect();

        let batches = try_join_all(keys.iter().map(|key| self.store.query_category_index(key))).await?;

        let mut sessions = batches
            .into_iter()
            .flatten()
            .map(|record| SessionMapper::to_domain(&record, &[]))
            .collect::<Result<Vec<_>, _>>()?;

        sessions.sort_by(|a, b| {
            a.session
                .date_time()
                .cmp(&b.session.date_time())
                .then_with(|| a.session.id().cmp(b.session.id()))
        });
        Ok(sessions)
    }

    async fn save(&self, session: &Session, expected_version: u64) -> Result<u64, BookingError> {
        let pk = session.id().to_string();
        let new_version = expected_version
            .checked_add(1)
            .ok_or_else(|| BookingError::invariant(format!("version overflow on {}", pk)))?;

        let durable = self.durable_booking_keys(&pk).await?;
        let fresh = session
            .bookings()
            .filter(|booking| !durable.contains(booking.email().as_str()))
            .count();
        // Counted from durable records so a retry after a failed insert
        // reconciles the counter.
        let booking_count = u32::try_from(durable.len() + fresh)
            .map_err(|_| BookingError::invariant(format!("booking count overflow on {}", pk)))?;

        let bump = VersionBump {
            expected_version,
            new_version,
            booking_count,
            updated_at: session.updated_at().to_rfc3339(),
        };
        match self.store.update_session_if_version(&pk, &bump).await {
            Ok(()) => {}
            Err(StoreError::ConditionFailed) => {
                return Err(BookingError::ConcurrentModification {
                    session_id: *session.id(),
                    expected_version,
                })
            }
            Err(e) => return Err(e.into()),
        }

        self.insert_bookings(session, &durable).await?;
        Ok(new_version)
    }

    async fn create(&self, session: &Session) -> Result<(), BookingError> {
        let persisted = SessionMapper::to_persistence(session, 0);
        match self.store.insert_session_if_absent(&persisted.session).await {
            Ok(()) => {}
            Err(StoreError::ConditionFailed) => {
                return Err(BookingError::AlreadyExists(*session.id()))
            }
            Err(e) => return Err(e.into()),
        }

        self.insert_bookings(session, &HashSet::new()).await
    }
}
