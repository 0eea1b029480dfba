//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `booking` - Session aggregate, bookings and the booking error taxonomy

pub mod booking;
pub mod foundation;
