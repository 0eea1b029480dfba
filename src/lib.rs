//! Class Booking - Capacity-bounded class sessions
//!
//! Salsa, bachata and reggaeton sessions with a fixed number of spots.
//! Bookings are committed with optimistic concurrency so a session is never
//! overbooked and a participant never holds two spots in the same session.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
