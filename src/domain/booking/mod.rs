//! Booking domain module.
//!
//! The capacity-bounded session aggregate, its bookings, and the error
//! taxonomy shared by everything that reads or writes sessions.

mod aggregate;
mod booking;
mod errors;

pub use aggregate::{Roster, Session};
pub use booking::Booking;
pub use errors::{BookingError, DataIntegrityError, DetectedBy};
