//! Session aggregate.
//!
//! A session is one scheduled class with a fixed number of spots. It is the
//! only place the booking rules live: no over-booking and at most one
//! booking per participant email.
//!
//! # Ownership
//!
//! Each request loads its own private copy. The version the copy was loaded
//! at is tracked by the repository, not here.

use std::collections::BTreeMap;

use crate::domain::foundation::{
    Email, SessionDateTime, SessionId, SessionType, Timestamp, ValidationError,
};

use super::{Booking, BookingError, DetectedBy};

/// The participants booked on a session, as far as this copy knows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Roster {
    /// Every booking was loaded; the map's size is the booked count.
    Full(BTreeMap<Email, Booking>),

    /// Only the recorded count was loaded. This is what list and search
    /// reads see, and what a direct read sees while booking records are
    /// not yet written. Bookings made on this copy go into `added`.
    CountOnly {
        recorded: u32,
        added: BTreeMap<Email, Booking>,
    },
}

impl Roster {
    pub fn empty() -> Self {
        Roster::Full(BTreeMap::new())
    }

    pub fn count_only(recorded: u32) -> Self {
        Roster::CountOnly {
            recorded,
            added: BTreeMap::new(),
        }
    }

    /// Builds a full roster from loaded bookings, keyed by email.
    pub fn from_bookings(bookings: impl IntoIterator<Item = Booking>) -> Self {
        Roster::Full(
            bookings
                .into_iter()
                .map(|booking| (booking.email().clone(), booking))
                .collect(),
        )
    }

    pub fn count(&self) -> u32 {
        let known = u32::try_from(self.known().len()).unwrap_or(u32::MAX);
        match self {
            Roster::Full(_) => known,
            Roster::CountOnly { recorded, .. } => recorded.saturating_add(known),
        }
    }

    /// Bookings this copy holds in memory.
    fn known(&self) -> &BTreeMap<Email, Booking> {
        match self {
            Roster::Full(bookings) | Roster::CountOnly { added: bookings, .. } => bookings,
        }
    }

    fn known_mut(&mut self) -> &mut BTreeMap<Email, Booking> {
        match self {
            Roster::Full(bookings) | Roster::CountOnly { added: bookings, .. } => bookings,
        }
    }
}

/// Session aggregate - a capacity-bounded set of bookings.
///
/// # Invariants
///
/// - `max_spots > 0`
/// - booked count never exceeds `max_spots`
/// - no two bookings share an email
/// - `id` never changes after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    session_type: SessionType,
    max_spots: u32,
    roster: Roster,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// Create a new session with no bookings.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `max_spots` is zero
    pub fn new(
        id: SessionId,
        session_type: SessionType,
        max_spots: u32,
    ) -> Result<Self, ValidationError> {
        if max_spots == 0 {
            return Err(ValidationError::out_of_range(
                "maxSpots",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            id,
            session_type,
            max_spots,
            roster: Roster::empty(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a session from persistence (no validation).
    pub fn reconstitute(
        id: SessionId,
        session_type: SessionType,
        max_spots: u32,
        roster: Roster,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_type,
            max_spots,
            roster,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn session_type(&self) -> &SessionType {
        &self.session_type
    }

    /// Returns when the session takes place, derived from its identity.
    pub fn date_time(&self) -> SessionDateTime {
        self.id.date_time()
    }

    pub fn max_spots(&self) -> u32 {
        self.max_spots
    }

    pub fn booked_count(&self) -> u32 {
        self.roster.count()
    }

    pub fn spots_remaining(&self) -> u32 {
        self.max_spots.saturating_sub(self.booked_count())
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Returns true if every booking was loaded, not just the count.
    pub fn is_fully_loaded(&self) -> bool {
        matches!(self.roster, Roster::Full(_))
    }

    /// Iterates the bookings held in memory, in email order. A count-only
    /// copy yields only the bookings made on it.
    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.roster.known().values()
    }

    /// True if this copy knows `email` holds a booking.
    pub fn is_booked(&self, email: &Email) -> bool {
        self.roster.known().contains_key(email)
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Reserve one spot for `email`.
    ///
    /// # Errors
    ///
    /// - `CapacityExceeded` if no spots remain
    /// - `DuplicateParticipant` if `email` already holds a booking this copy
    ///   knows about. A count-only copy knows only its own bookings; the
    ///   store's exists-check catches the rest on save.
    pub fn book(&mut self, email: Email) -> Result<Booking, BookingError> {
        if self.spots_remaining() == 0 {
            return Err(BookingError::CapacityExceeded {
                session_id: self.id,
                max_spots: self.max_spots,
            });
        }

        let bookings = self.roster.known_mut();
        if bookings.contains_key(&email) {
            return Err(BookingError::DuplicateParticipant {
                email,
                session_id: self.id,
                detected_by: DetectedBy::Aggregate,
            });
        }

        let now = Timestamp::now();
        let booking = Booking::new(email.clone(), now);
        bookings.insert(email, booking.clone());
        self.updated_at = now;
        Ok(booking)
    }

    /// Check the capacity invariants.
    ///
    /// # Errors
    ///
    /// - `InvariantViolation` if `max_spots` is zero or the count exceeds it
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.max_spots == 0 {
            return Err(BookingError::invariant(format!(
                "{} has no spots",
                self.id
            )));
        }
        if self.booked_count() > self.max_spots {
            return Err(BookingError::invariant(format!(
                "{} has {} bookings for {} spots",
                self.id,
                self.booked_count(),
                self.max_spots
            )));
        }
        Ok(())
    }
}
