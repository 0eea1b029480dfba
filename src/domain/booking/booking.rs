//! A single participant's reservation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Email, Timestamp};

/// One unit of a session's capacity held by one participant.
///
/// Has no identity of its own; it is unique per (session, email).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    email: Email,
    booked_at: Timestamp,
}

impl Booking {
    pub(crate) fn new(email: Email, booked_at: Timestamp) -> Self {
        Self { email, booked_at }
    }

    /// Rebuilds a booking read from storage.
    pub fn reconstitute(email: Email, booked_at: Timestamp) -> Self {
        Self::new(email, booked_at)
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn booked_at(&self) -> &Timestamp {
        &self.booked_at
    }
}
