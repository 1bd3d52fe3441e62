//! Core types used throughout the domain layer
//!
//! This module defines identifiers, the caller identity that selects a
//! storage backend, the canonical color palette, and the calendar-day key
//! used for every completion comparison.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Identifier for a habit
///
/// The relational backend assigns a UUID; the file backend has no separate
/// key and uses the habit name itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub String);

impl HabitId {
    /// Generate a new random habit ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Identity used by the file backend, where the name is the key
    pub fn from_name(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque owner key handed to us by the login collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerKey(String);

impl OwnerKey {
    /// Build an owner key, rejecting blank tokens
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Who is calling
///
/// Authenticated callers are served by the relational store, anonymous
/// callers by the shared file document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(OwnerKey),
}

impl Caller {
    /// Build a caller from an optional session token
    pub fn from_token(token: Option<&str>) -> Self {
        match token.and_then(OwnerKey::new) {
            Some(owner) => Caller::Authenticated(owner),
            None => Caller::Anonymous,
        }
    }

    pub fn owner(&self) -> Option<&OwnerKey> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(owner) => Some(owner),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.owner().is_some()
    }
}

/// Hex written when a color token is not recognized
pub const FALLBACK_HEX: &str = "#6b7280";

/// The eight canonical habit colors
///
/// Each token maps to exactly one hex code. Unknown tokens are written as
/// [`FALLBACK_HEX`] and unknown hex codes read back as [`HabitColor::Blue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitColor {
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    #[default]
    Blue,
    Purple,
    Pink,
}

impl HabitColor {
    pub const ALL: [HabitColor; 8] = [
        HabitColor::Red,
        HabitColor::Orange,
        HabitColor::Yellow,
        HabitColor::Green,
        HabitColor::Teal,
        HabitColor::Blue,
        HabitColor::Purple,
        HabitColor::Pink,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            HabitColor::Red => "red",
            HabitColor::Orange => "orange",
            HabitColor::Yellow => "yellow",
            HabitColor::Green => "green",
            HabitColor::Teal => "teal",
            HabitColor::Blue => "blue",
            HabitColor::Purple => "purple",
            HabitColor::Pink => "pink",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            HabitColor::Red => "#ef4444",
            HabitColor::Orange => "#f97316",
            HabitColor::Yellow => "#eab308",
            HabitColor::Green => "#22c55e",
            HabitColor::Teal => "#14b8a6",
            HabitColor::Blue => "#3b82f6",
            HabitColor::Purple => "#a855f7",
            HabitColor::Pink => "#ec4899",
        }
    }

    /// Look up a token, case-insensitively
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|color| color.token().eq_ignore_ascii_case(token))
    }

    /// Hex code to write for a raw token
    pub fn hex_for_token(token: &str) -> &'static str {
        Self::from_token(token).map_or(FALLBACK_HEX, |color| color.hex())
    }

    /// Color to report for a stored hex code
    pub fn from_hex(hex: &str) -> Self {
        let hex = hex.trim();
        Self::ALL
            .into_iter()
            .find(|color| color.hex().eq_ignore_ascii_case(hex))
            .unwrap_or_default()
    }

    /// Run a raw token through the write and read mappings
    ///
    /// Both backends use this so an unknown token ends up as the same
    /// color regardless of where it was stored.
    pub fn normalize(token: &str) -> Self {
        Self::from_hex(Self::hex_for_token(token))
    }
}

impl fmt::Display for HabitColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A calendar day with no time-of-day component
///
/// All completion membership tests and calendar lookups compare day keys,
/// never raw timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DomainError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidDate(format!("{year}-{month:02}-{day:02}")))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DomainError::InvalidDate(s.to_string()))
    }
}

/// The calendar convention used to cut instants into days
///
/// One zone is chosen per process and used on both the write path and
/// the read path, so a day stored by a toggle is the same day the
/// calendar looks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayZone {
    /// The host's local time zone
    #[default]
    Local,
    /// A fixed UTC offset
    Fixed(FixedOffset),
}

impl DayZone {
    pub fn utc() -> Self {
        DayZone::Fixed(Utc.fix())
    }

    /// Zone with a fixed offset in minutes east of UTC
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, DomainError> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(DayZone::Fixed)
            .ok_or_else(|| DomainError::Validation {
                message: format!("UTC offset out of range: {minutes} minutes"),
            })
    }

    /// Calendar day an instant falls on
    pub fn day_of(&self, instant: DateTime<Utc>) -> DayKey {
        match self {
            DayZone::Local => DayKey(instant.with_timezone(&Local).date_naive()),
            DayZone::Fixed(offset) => DayKey(instant.with_timezone(offset).date_naive()),
        }
    }

    /// Calendar day for an epoch-millisecond timestamp
    pub fn day_of_millis(&self, millis: i64) -> Result<DayKey, DomainError> {
        DateTime::from_timestamp_millis(millis)
            .map(|instant| self.day_of(instant))
            .ok_or_else(|| DomainError::InvalidDate(format!("timestamp out of range: {millis}")))
    }

    /// Epoch milliseconds of midnight at the start of `day`
    pub fn start_of_day_millis(&self, day: DayKey) -> i64 {
        let midnight = day.0.and_time(NaiveTime::MIN);
        let local = match self {
            DayZone::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.timestamp_millis()),
            DayZone::Fixed(offset) => offset
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.timestamp_millis()),
        };
        // Midnight can fall in a DST gap; fall back to treating it as UTC.
        local.unwrap_or_else(|| midnight.and_utc().timestamp_millis())
    }

    /// Instant at the start of `day`
    pub fn start_of_day(&self, day: DayKey) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.start_of_day_millis(day)).unwrap_or_default()
    }
}
