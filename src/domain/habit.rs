//! Habit entity and its completion set
//!
//! A habit is a named activity with a color tag and the set of calendar
//! days on which it was completed. The only mutation after creation is a
//! single-day toggle.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DayKey, DomainError, HabitColor, HabitId};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

/// Ordered set of completed days
///
/// Backed by a `BTreeSet`, so every insertion keeps the days unique and
/// ascending without a separate sort pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletedDays(BTreeSet<DayKey>);

impl CompletedDays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, day: DayKey) -> bool {
        self.0.contains(&day)
    }

    /// Flip membership of `day`, returning the new membership
    ///
    /// Exactly one of insert or remove happens per call.
    pub fn toggle(&mut self, day: DayKey) -> bool {
        if self.0.remove(&day) {
            false
        } else {
            self.0.insert(day);
            true
        }
    }

    /// Force membership of `day` to `completed`
    pub fn set(&mut self, day: DayKey, completed: bool) {
        if completed {
            self.0.insert(day);
        } else {
            self.0.remove(&day);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Days in ascending order
    pub fn iter(&self) -> impl Iterator<Item = DayKey> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<DayKey> for CompletedDays {
    fn from_iter<I: IntoIterator<Item = DayKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A tracked habit as returned by either backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Backend-assigned key, or the name for the file backend
    pub id: HabitId,
    /// Display name, unique within one owner's collection
    pub name: String,
    pub description: String,
    pub color: HabitColor,
    pub created_at: DateTime<Utc>,
    pub completed_days: CompletedDays,
}

impl Habit {
    /// Build a habit from a validated draft and the identity the backend chose
    pub fn from_draft(id: HabitId, draft: HabitDraft) -> Self {
        Self {
            id,
            color: HabitColor::normalize(&draft.color),
            name: draft.name,
            description: draft.description,
            created_at: draft.created_at,
            completed_days: draft.completed_days,
        }
    }

    pub fn is_completed_on(&self, day: DayKey) -> bool {
        self.completed_days.contains(day)
    }
}

/// Owner-supplied fields for a new habit
///
/// `color` is the raw token as sent by the caller; backends normalize it.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitDraft {
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub completed_days: CompletedDays,
}

impl HabitDraft {
    /// Create a draft with validation
    ///
    /// The name is trimmed before it is stored.
    pub fn new(
        name: &str,
        description: &str,
        color: &str,
        created_at: DateTime<Utc>,
        completed_days: CompletedDays,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        Self::validate_name(name)?;
        Self::validate_description(description)?;

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            color: color.trim().to_string(),
            created_at,
            completed_days,
        })
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string(),
            ));
        }

        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::InvalidHabitName(format!(
                "Habit name cannot be longer than {MAX_NAME_LEN} characters"
            )));
        }

        Ok(())
    }

    fn validate_description(description: &str) -> Result<(), DomainError> {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::Validation {
                message: format!(
                    "Description cannot be longer than {MAX_DESCRIPTION_LEN} characters"
                ),
            });
        }
        Ok(())
    }
}
