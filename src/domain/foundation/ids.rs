//! Session identity: the compound natural key `SESSION#<date>#<weekday>#<slot>`.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::date_time::{format_calendar_date, parse_calendar_date, SessionDateTime};
use super::ValidationError;

/// Literal prefix of every session identity string.
pub const SESSION_ID_PREFIX: &str = "SESSION";

/// Day of the week a session runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Returns all weekdays, Monday first.
    pub fn all() -> &'static [Weekday] {
        &[
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
    }

    /// Returns the weekday a calendar date falls on.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
            Weekday::Sun => "SUN",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::all()
            .iter()
            .copied()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "weekday",
                    format!(
                        "Invalid day of week: {}. Must be one of: MON, TUE, WED, THU, FRI, SAT, SUN",
                        s
                    ),
                )
            })
    }
}

/// The fixed start times a session can be scheduled at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StartSlot {
    T1830,
    T1930,
    T2030,
}

impl StartSlot {
    pub fn all() -> &'static [StartSlot] {
        &[StartSlot::T1830, StartSlot::T1930, StartSlot::T2030]
    }

    /// Compact form used in keys, e.g. `1830`.
    pub fn as_str(&self) -> &'static str {
        match self {
            StartSlot::T1830 => "1830",
            StartSlot::T1930 => "1930",
            StartSlot::T2030 => "2030",
        }
    }

    /// Clock form used in records and projections, e.g. `18:30`.
    pub fn clock(&self) -> &'static str {
        match self {
            StartSlot::T1830 => "18:30",
            StartSlot::T1930 => "19:30",
            StartSlot::T2030 => "20:30",
        }
    }

    pub fn time(&self) -> NaiveTime {
        let (hour, minute) = match self {
            StartSlot::T1830 => (18, 30),
            StartSlot::T1930 => (19, 30),
            StartSlot::T2030 => (20, 30),
        };
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Parses the `HH:mm` clock form.
    pub fn from_clock(value: &str) -> Result<Self, ValidationError> {
        StartSlot::all()
            .iter()
            .copied()
            .find(|slot| slot.clock() == value)
            .ok_or_else(|| invalid_slot(value))
    }
}

fn invalid_slot(value: &str) -> ValidationError {
    ValidationError::invalid_format(
        "time",
        format!("Invalid time: {}. Must be one of: 1830, 1930, 2030", value),
    )
}

impl fmt::Display for StartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartSlot {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StartSlot::all()
            .iter()
            .copied()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| invalid_slot(s))
    }
}

/// Identity of a scheduled session, doubling as its storage primary key.
///
/// Renders as `SESSION#2024-12-09#MON#1830`; [`SessionId::parse`] is the
/// exact inverse of `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId {
    date: NaiveDate,
    weekday: Weekday,
    slot: StartSlot,
}

impl SessionId {
    /// Creates an identity from already-validated parts.
    pub fn new(date: NaiveDate, weekday: Weekday, slot: StartSlot) -> Self {
        Self {
            date,
            weekday,
            slot,
        }
    }

    /// Creates an identity from a `YYYY-MM-DD` date string.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the date is malformed or not a real calendar date
    pub fn from_parts(date: &str, weekday: Weekday, slot: StartSlot) -> Result<Self, ValidationError> {
        Ok(Self::new(parse_calendar_date(date)?, weekday, slot))
    }

    /// Parses the canonical `SESSION#<date>#<weekday>#<slot>` form.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the string does not have exactly four `#`-separated
    ///   segments starting with `SESSION`, or if any segment is invalid
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = value.split('#').collect();
        if parts.len() != 4 || parts[0] != SESSION_ID_PREFIX {
            return Err(ValidationError::invalid_format(
                "sessionId",
                format!(
                    "Invalid sessionId format: {}. Expected format: SESSION#YYYY-MM-DD#DAY#TIME",
                    value
                ),
            ));
        }

        let date = parse_calendar_date(parts[1])?;
        let weekday = parts[2].parse::<Weekday>()?;
        let slot = parts[3].parse::<StartSlot>()?;
        Ok(Self::new(date, weekday, slot))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn slot(&self) -> StartSlot {
        self.slot
    }

    /// Returns when the session takes place.
    pub fn date_time(&self) -> SessionDateTime {
        SessionDateTime::from_parts(self.date, self.slot.time())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}#{}#{}",
            SESSION_ID_PREFIX,
            format_calendar_date(self.date),
            self.weekday,
            self.slot
        )
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.to_string()
    }
}
