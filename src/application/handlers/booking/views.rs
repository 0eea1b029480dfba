//! Read-side projections handed to collaborators.

use crate::domain::booking::{Booking, Session};
use crate::domain::foundation::{Category, Email, SessionId, Timestamp};

/// Public projection of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: SessionId,
    pub category: Category,
    pub level: Option<u8>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:mm`
    pub start_time: String,
    pub max_spots: u32,
    pub spots_remaining: u32,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        let date_time = session.date_time();
        Self {
            id: *session.id(),
            category: session.session_type().category(),
            level: session.session_type().level(),
            date: date_time.date_string(),
            start_time: date_time.start_time_string(),
            max_spots: session.max_spots(),
            spots_remaining: session.spots_remaining(),
        }
    }
}

/// Confirmation of a committed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub session_id: SessionId,
    pub email: Email,
    pub booked_at: Timestamp,
}

impl BookingReceipt {
    pub fn new(session_id: SessionId, booking: &Booking) -> Self {
        Self {
            session_id,
            email: booking.email().clone(),
            booked_at: *booking.booked_at(),
        }
    }
}
