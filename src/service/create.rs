//! Habit creation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Caller, CompletedDays, DayZone, DomainError, HabitDraft, HabitRecord};
use crate::service::ServiceError;
use crate::storage::HabitStore;

/// Parameters for creating a new habit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitParams {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Color token; unknown tokens fall back to the neutral color
    #[serde(default)]
    pub color: String,
    /// Epoch milliseconds; defaults to now
    #[serde(default)]
    pub created_date: Option<i64>,
    /// Epoch milliseconds of days already completed
    #[serde(default)]
    pub completed_dates: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabitResponse {
    pub data: HabitRecord,
}

pub async fn create_habit(
    store: &dyn HabitStore,
    caller: &Caller,
    zone: &DayZone,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ServiceError> {
    let created_at = match params.created_date {
        Some(millis) => DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            DomainError::InvalidDate(format!("createdDate out of range: {millis}"))
        })?,
        None => Utc::now(),
    };
    let completed_days = params
        .completed_dates
        .iter()
        .map(|&millis| zone.day_of_millis(millis))
        .collect::<Result<CompletedDays, _>>()?;

    let draft = HabitDraft::new(
        &params.name,
        &params.description,
        &params.color,
        created_at,
        completed_days,
    )?;

    let habit = store.create(caller, draft).await?;
    tracing::info!(habit = %habit.name, id = %habit.id, "created habit");

    Ok(CreateHabitResponse {
        data: HabitRecord::from_habit(&habit, zone),
    })
}
