//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the class booking domain.

mod date_time;
mod email;
mod errors;
mod ids;
mod session_type;
mod timestamp;

pub use date_time::{format_calendar_date, parse_calendar_date, parse_clock_time, SessionDateTime};
pub use email::Email;
pub use errors::{ErrorCode, ValidationError};
pub use ids::{SessionId, StartSlot, Weekday, SESSION_ID_PREFIX};
pub use session_type::{Category, SessionType};
pub use timestamp::Timestamp;
