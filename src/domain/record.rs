//! Epoch-millisecond wire shape of a habit
//!
//! The file document and the HTTP surface both describe habits with
//! `createdDate` and `completedDates` as epoch milliseconds. Days are
//! encoded as the instant of local midnight in the configured zone.

use serde::{Deserialize, Serialize};

use crate::domain::{CompletedDays, DayZone, DomainError, Habit, HabitColor, HabitId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    pub created_date: i64,
    #[serde(default)]
    pub completed_dates: Vec<i64>,
}

impl HabitRecord {
    pub fn from_habit(habit: &Habit, zone: &DayZone) -> Self {
        Self {
            id: Some(habit.id.to_string()),
            name: habit.name.clone(),
            description: habit.description.clone(),
            color: habit.color.token().to_string(),
            created_date: habit.created_at.timestamp_millis(),
            completed_dates: habit
                .completed_days
                .iter()
                .map(|day| zone.start_of_day_millis(day))
                .collect(),
        }
    }

    /// Decode into a habit, cutting every timestamp down to its day
    ///
    /// Duplicate or unsorted timestamps collapse into the ordered day set.
    /// Without an `id` the name is used as identity.
    pub fn into_habit(self, zone: &DayZone) -> Result<Habit, DomainError> {
        let created_at = chrono::DateTime::from_timestamp_millis(self.created_date).ok_or_else(|| {
            DomainError::InvalidDate(format!("createdDate out of range: {}", self.created_date))
        })?;
        let completed_days = self
            .completed_dates
            .iter()
            .map(|&millis| zone.day_of_millis(millis))
            .collect::<Result<CompletedDays, _>>()?;

        Ok(Habit {
            id: self
                .id
                .map(HabitId)
                .unwrap_or_else(|| HabitId::from_name(&self.name)),
            color: HabitColor::normalize(&self.color),
            name: self.name,
            description: self.description,
            created_at,
            completed_days,
        })
    }
}
