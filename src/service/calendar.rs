//! Month grid for an owner's stored habits

use serde::{Deserialize, Serialize};

use crate::domain::{aggregate, Caller, MonthCursor, MonthGrid};
use crate::service::ServiceError;
use crate::storage::HabitStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalendarParams {
    pub year: i32,
    /// 1-based month
    pub month: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub calendar: MonthGrid,
}

pub async fn month_calendar(
    store: &dyn HabitStore,
    caller: &Caller,
    params: CalendarParams,
) -> Result<CalendarResponse, ServiceError> {
    let month = MonthCursor::new(params.year, params.month)?;
    let habits = store.list(caller).await?;

    Ok(CalendarResponse {
        calendar: aggregate(&habits, month),
    })
}
