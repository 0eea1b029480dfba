//! Translation between the Session aggregate and flat store records.
//!
//! Store records carry plain strings and numbers; every field is re-validated
//! through the value objects on the way in, and anything that does not
//! validate is reported as a [`DataIntegrityError`].

use crate::domain::booking::{Booking, DataIntegrityError, Roster, Session};
use crate::domain::foundation::{
    format_calendar_date, Category, Email, SessionId, SessionType, Timestamp,
};
use crate::ports::{BookingRecord, SessionRecord, VersionedSession};

/// Index key for a session type: `CATEGORY#SALSA#1` or `CATEGORY#REGGAETON`.
pub fn category_index_key(session_type: &SessionType) -> String {
    let category = session_type.category().as_str().to_uppercase();
    match session_type.level() {
        Some(level) => format!("CATEGORY#{}#{}", category, level),
        None => format!("CATEGORY#{}", category),
    }
}

/// Index sort key for a session: `<date>#<weekday>#<slot>`.
pub fn category_index_sort_key(id: &SessionId) -> String {
    format!(
        "{}#{}#{}",
        format_calendar_date(id.date()),
        id.weekday(),
        id.slot()
    )
}

/// Records produced from one aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub session: SessionRecord,
    pub bookings: Vec<BookingRecord>,
}

pub struct SessionMapper;

impl SessionMapper {
    /// Rebuild an aggregate and its committed version from store records.
    ///
    /// An empty `bookings` slice loads the session count-only, taking the
    /// count from the metadata record. A non-empty slice must hold exactly
    /// `booking_count` records.
    ///
    /// # Errors
    ///
    /// - `BookingCountMismatch` if a non-empty `bookings` disagrees with the count
    /// - `CorruptRecord` if any stored field fails validation or disagrees
    ///   with the identity in the primary key
    pub fn to_domain(
        record: &SessionRecord,
        bookings: &[BookingRecord],
    ) -> Result<VersionedSession, DataIntegrityError> {
        let pk = record.pk.as_str();
        let id = SessionId::parse(pk).map_err(|e| DataIntegrityError::corrupt(pk, e))?;

        let category = record
            .category
            .parse::<Category>()
            .map_err(|e| DataIntegrityError::corrupt(pk, e))?;
        let session_type = SessionType::new(category, record.level)
            .map_err(|e| DataIntegrityError::corrupt(pk, e))?;

        check_matches(pk, "date", &record.date, &format_calendar_date(id.date()))?;
        check_matches(pk, "weekday", &record.weekday, id.weekday().as_str())?;
        check_matches(pk, "startTime", &record.start_time, id.slot().clock())?;
        check_matches(pk, "indexPk", &record.index_pk, &category_index_key(&session_type))?;
        check_matches(pk, "indexSk", &record.index_sk, &category_index_sort_key(&id))?;

        let created_at = parse_timestamp(pk, &record.created_at)?;
        let updated_at = parse_timestamp(pk, &record.updated_at)?;

        let roster = if bookings.is_empty() {
            if record.booking_count == 0 {
                Roster::empty()
            } else {
                Roster::count_only(record.booking_count)
            }
        } else {
            if bookings.len() != record.booking_count as usize {
                return Err(DataIntegrityError::BookingCountMismatch {
                    session_id: id,
                    recorded: record.booking_count,
                    loaded: bookings.len(),
                });
            }
            let loaded = bookings
                .iter()
                .map(|booking| Self::booking_to_domain(pk, booking))
                .collect::<Result<Vec<_>, _>>()?;
            let roster = Roster::from_bookings(loaded);
            if roster.count() != record.booking_count {
                return Err(DataIntegrityError::corrupt(pk, "duplicate booking records"));
            }
            roster
        };

        let session = Session::reconstitute(
            id,
            session_type,
            record.max_spots,
            roster,
            created_at,
            updated_at,
        );
        session
            .validate()
            .map_err(|e| DataIntegrityError::corrupt(pk, e))?;

        Ok(VersionedSession::new(session, record.version))
    }

    /// Flatten an aggregate into one metadata record plus one record per
    /// loaded booking, stamped with `version`.
    pub fn to_persistence(session: &Session, version: u64) -> PersistedSession {
        let id = session.id();
        let record = SessionRecord {
            pk: id.to_string(),
            index_pk: category_index_key(session.session_type()),
            index_sk: category_index_sort_key(id),
            category: session.session_type().category().as_str().to_string(),
            level: session.session_type().level(),
            date: format_calendar_date(id.date()),
            weekday: id.weekday().as_str().to_string(),
            start_time: id.slot().clock().to_string(),
            max_spots: session.max_spots(),
            booking_count: session.booked_count(),
            version,
            created_at: session.created_at().to_rfc3339(),
            updated_at: session.updated_at().to_rfc3339(),
        };

        let bookings = session
            .bookings()
            .map(|booking| Self::booking_to_record(id, booking))
            .collect();

        PersistedSession {
            session: record,
            bookings,
        }
    }

    pub fn booking_to_record(id: &SessionId, booking: &Booking) -> BookingRecord {
        BookingRecord {
            pk: id.to_string(),
            sk: booking.email().as_str().to_string(),
            booked_at: booking.booked_at().to_rfc3339(),
        }
    }

    fn booking_to_domain(pk: &str, record: &BookingRecord) -> Result<Booking, DataIntegrityError> {
        let key = format!("{}/{}", record.pk, record.sk);
        if record.pk != pk {
            return Err(DataIntegrityError::corrupt(key, "booking belongs to another session"));
        }
        let email = Email::new(record.sk.as_str()).map_err(|e| DataIntegrityError::corrupt(&key, e))?;
        let booked_at = parse_timestamp(&key, &record.booked_at)?;
        Ok(Booking::reconstitute(email, booked_at))
    }
}

fn check_matches(pk: &str, field: &str, stored: &str, expected: &str) -> Result<(), DataIntegrityError> {
    if stored == expected {
        Ok(())
    } else {
        Err(DataIntegrityError::corrupt(
            pk,
            format!("{} is '{}' but the key says '{}'", field, stored, expected),
        ))
    }
}

fn parse_timestamp(key: &str, value: &str) -> Result<Timestamp, DataIntegrityError> {
    Timestamp::parse_rfc3339(value).map_err(|e| DataIntegrityError::corrupt(key, e))
}
