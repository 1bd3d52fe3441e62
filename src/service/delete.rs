//! Habit deletion; completions go with the habit

use serde::{Deserialize, Serialize};

use crate::domain::Caller;
use crate::service::{habit_name, ServiceError};
use crate::storage::HabitStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteHabitParams {
    pub habit_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteHabitResponse {
    pub habit_name: String,
}

pub async fn delete_habit(
    store: &dyn HabitStore,
    caller: &Caller,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ServiceError> {
    let name = habit_name(&params.habit_name)?;

    store.delete(caller, name).await?;
    tracing::info!(habit = name, "deleted habit");

    Ok(DeleteHabitResponse {
        habit_name: name.to_string(),
    })
}
