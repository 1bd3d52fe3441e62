//! Listing an owner's habits

use serde::{Deserialize, Serialize};

use crate::domain::{Caller, DayZone, HabitRecord};
use crate::service::ServiceError;
use crate::storage::HabitStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitRecord>,
}

pub async fn list_habits(
    store: &dyn HabitStore,
    caller: &Caller,
    zone: &DayZone,
) -> Result<ListHabitsResponse, ServiceError> {
    let habits = store.list(caller).await?;
    tracing::debug!("Listed {} habits", habits.len());

    Ok(ListHabitsResponse {
        habits: habits
            .iter()
            .map(|habit| HabitRecord::from_habit(habit, zone))
            .collect(),
    })
}
