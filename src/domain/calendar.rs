//! Month grid aggregation and month navigation
//!
//! The grid is a pure function of a habit collection and a month. It does
//! not touch storage, so it can be computed from a client's optimistic
//! mirror as well as from server state.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{DayKey, DomainError, Habit};

/// A year and month, always anchored on day 1
///
/// Deserialization goes through [`MonthCursor::new`], so an out-of-range
/// month is rejected instead of stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMonthCursor")]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawMonthCursor {
    year: i32,
    month: u32,
}

impl TryFrom<RawMonthCursor> for MonthCursor {
    type Error = DomainError;

    fn try_from(raw: RawMonthCursor) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
    }
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(DomainError::Validation {
                message: format!("Invalid month: {year}-{month}"),
            });
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`; the day-of-month is dropped
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        // new() and containing() only admit valid year/month pairs
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.first_day().checked_add_months(Months::new(1)) {
            Some(next) => next.pred_opt().map_or(31, |last| last.day()),
            None => 31,
        }
    }

    /// Following month, stepped from day 1 so no day-of-month rollover occurs
    pub fn next(&self) -> Self {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map(Self::containing)
            .unwrap_or(*self)
    }

    /// Preceding month, stepped from day 1
    pub fn previous(&self) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map(Self::containing)
            .unwrap_or(*self)
    }
}

/// One slot in the month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarCell {
    /// Padding before day 1
    Blank,
    /// A day of the month and the habits completed on it, in input order
    Day { day: u32, habits: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Weekday of day 1 with Sunday as 0
    pub leading_blanks: u32,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    /// Habit names completed on `day`, if the day exists in this month
    pub fn habits_on(&self, day: u32) -> Option<&[String]> {
        self.cells.iter().find_map(|cell| match cell {
            CalendarCell::Day { day: d, habits } if *d == day => Some(habits.as_slice()),
            _ => None,
        })
    }
}

/// Lay out `month` as a grid of completions
///
/// Each day is matched by its calendar-day key, so stored completions
/// compare equal regardless of the time of day they were recorded at.
pub fn aggregate(habits: &[Habit], month: MonthCursor) -> MonthGrid {
    let first = month.first_day();
    let leading_blanks = first.weekday().num_days_from_sunday();
    let days_in_month = month.days_in_month();

    let mut cells = Vec::with_capacity((leading_blanks + days_in_month) as usize);
    cells.extend((0..leading_blanks).map(|_| CalendarCell::Blank));

    for (date, day) in first.iter_days().zip(1..=days_in_month) {
        let key = DayKey::new(date);
        let completed = habits
            .iter()
            .filter(|habit| habit.is_completed_on(key))
            .map(|habit| habit.name.clone())
            .collect();
        cells.push(CalendarCell::Day {
            day,
            habits: completed,
        });
    }

    MonthGrid {
        year: month.year(),
        month: month.month(),
        leading_blanks,
        cells,
    }
}
