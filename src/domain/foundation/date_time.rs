//! Calendar date and start time of a session.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::ValidationError;

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

static TIME_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("time pattern compiles"));

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` string into a real calendar date.
///
/// `2024-02-30` has the right shape but is rejected.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, ValidationError> {
    if !DATE_SHAPE.is_match(value) {
        return Err(ValidationError::invalid_format(
            "date",
            "Date must be in YYYY-MM-DD format",
        ));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ValidationError::invalid_format("date", format!("Invalid date: {}", value)))
}

/// Renders a date as `YYYY-MM-DD`.
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses an `HH:mm` string within 00:00-23:59.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, ValidationError> {
    let captures = TIME_SHAPE.captures(value).ok_or_else(|| {
        ValidationError::invalid_format("startTime", "Time must be in HH:mm format (00:00-23:59)")
    })?;
    let hour: u32 = captures[1].parse().map_err(|_| {
        ValidationError::invalid_format("startTime", "Time must be in HH:mm format (00:00-23:59)")
    })?;
    let minute: u32 = captures[2].parse().map_err(|_| {
        ValidationError::invalid_format("startTime", "Time must be in HH:mm format (00:00-23:59)")
    })?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        ValidationError::invalid_format("startTime", format!("Invalid time: {}", value))
    })
}

/// The date and start time a session takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionDateTime {
    date: NaiveDate,
    start_time: NaiveTime,
}

impl SessionDateTime {
    /// Creates a date-time from `YYYY-MM-DD` and `HH:mm` strings.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if either part is malformed or not a real date/time
    pub fn new(date: &str, start_time: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            date: parse_calendar_date(date)?,
            start_time: parse_clock_time(start_time)?,
        })
    }

    /// Creates a date-time from already-typed parts.
    pub fn from_parts(date: NaiveDate, start_time: NaiveTime) -> Self {
        Self { date, start_time }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    /// Returns the date as `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        format_calendar_date(self.date)
    }

    /// Returns the start time as `HH:mm`.
    pub fn start_time_string(&self) -> String {
        self.start_time.format("%H:%M").to_string()
    }

    /// Combined `YYYY-MM-DDTHH:mm:00` form used for ordering.
    pub fn to_iso_date_time(&self) -> String {
        format!("{}T{}:00", self.date_string(), self.start_time_string())
    }
}

impl fmt::Display for SessionDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date_string(), self.start_time_string())
    }
}
