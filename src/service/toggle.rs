//! Completion toggle
//!
//! Flips one calendar day for one habit. The request timestamp is cut down
//! to a day key first, so any time of day on the same date toggles the
//! same completion. Toggling is a pure flip: repeating the request undoes
//! it, and callers that need at-most-once delivery must deduplicate.

use serde::{Deserialize, Serialize};

use crate::domain::{Caller, DayZone};
use crate::service::{habit_name, ServiceError};
use crate::storage::HabitStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleParams {
    pub habit_name: String,
    /// Epoch milliseconds anywhere within the target day
    pub date: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResponse {
    /// Membership of the day after the toggle
    pub completed: bool,
}

pub async fn toggle_completion(
    store: &dyn HabitStore,
    caller: &Caller,
    zone: &DayZone,
    params: ToggleParams,
) -> Result<ToggleResponse, ServiceError> {
    let name = habit_name(&params.habit_name)?;
    let day = zone.day_of_millis(params.date)?;

    let completed = store.toggle(caller, name, day).await?;
    tracing::info!(habit = name, %day, completed, "toggled completion");

    Ok(ToggleResponse { completed })
}
