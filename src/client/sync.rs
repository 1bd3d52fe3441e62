//! Optimistic client-side mirror of the habit collection
//!
//! Every mutation is applied to the mirror before the request goes out and
//! is undone from a snapshot if the request fails. Requests are never held
//! back behind earlier ones, so several may be in flight at once; the
//! mirror lock is never held across an await.
//!
//! Toggle rollback restores the membership captured before the optimistic
//! flip instead of flipping again. When two toggles on the same habit and
//! day overlap and the earlier one fails, the restored value can still
//! disagree with the server until the next `refresh`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::{ClientError, HabitApi};
use crate::domain::{
    aggregate, CompletedDays, DayKey, DayZone, DomainError, Habit, HabitDraft, HabitId, MonthCursor,
    MonthGrid,
};
use crate::service::{CreateHabitParams, DeleteHabitParams, ToggleParams};

#[derive(Default)]
struct Mirror {
    habits: Vec<Habit>,
    /// Toggles awaiting a response, per habit and day
    pending: HashMap<(String, DayKey), usize>,
}

impl Mirror {
    fn habit_mut(&mut self, name: &str) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| habit.name == name)
    }
}

pub struct ClientSyncController<A> {
    api: A,
    zone: DayZone,
    mirror: Mutex<Mirror>,
}

impl<A: HabitApi> ClientSyncController<A> {
    pub fn new(api: A, zone: DayZone) -> Self {
        Self::with_habits(api, zone, Vec::new())
    }

    /// Start from an already-known collection
    pub fn with_habits(api: A, zone: DayZone, habits: Vec<Habit>) -> Self {
        Self {
            api,
            zone,
            mirror: Mutex::new(Mirror {
                habits,
                pending: HashMap::new(),
            }),
        }
    }

    fn mirror(&self) -> MutexGuard<'_, Mirror> {
        self.mirror.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the caller-visible collection, optimistic edits included
    pub fn habits(&self) -> Vec<Habit> {
        self.mirror().habits.clone()
    }

    /// Month grid over the mirror, optimistic edits included
    pub fn calendar(&self, month: MonthCursor) -> MonthGrid {
        aggregate(&self.mirror().habits, month)
    }

    /// Replace the mirror with the service's current collection
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let records = self.api.list().await?;
        let habits = records
            .into_iter()
            .map(|record| record.into_habit(&self.zone))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Refreshed mirror with {} habits", habits.len());
        self.mirror().habits = habits;
        Ok(())
    }

    /// Flip `name` on the day containing `date` (epoch ms)
    pub async fn toggle(&self, name: &str, date: i64) -> Result<bool, ClientError> {
        let day = self.zone.day_of_millis(date)?;
        let key = (name.to_string(), day);

        let prior = {
            let mut mirror = self.mirror();
            let habit = mirror
                .habit_mut(name)
                .ok_or_else(|| ClientError::UnknownHabit(name.to_string()))?;
            let prior = habit.is_completed_on(day);
            habit.completed_days.toggle(day);
            *mirror.pending.entry(key.clone()).or_default() += 1;
            prior
        };

        let result = self
            .api
            .toggle(ToggleParams {
                habit_name: name.to_string(),
                date,
            })
            .await;

        let mut mirror = self.mirror();
        let still_pending = match mirror.pending.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            _ => {
                mirror.pending.remove(&key);
                false
            }
        };

        match result {
            Ok(completed) => {
                // With nothing else in flight the server's answer is authoritative
                if !still_pending {
                    if let Some(habit) = mirror.habit_mut(name) {
                        habit.completed_days.set(day, completed);
                    }
                }
                Ok(completed)
            }
            Err(err) => {
                if let Some(habit) = mirror.habit_mut(name) {
                    habit.completed_days.set(day, prior);
                }
                tracing::warn!(
                    "Toggle of '{}' on {} failed, restored local state: {}",
                    name,
                    day,
                    err
                );
                Err(err)
            }
        }
    }

    /// Remove `name` locally, restoring the whole collection on failure
    pub async fn delete(&self, name: &str) -> Result<(), ClientError> {
        let snapshot = {
            let mut mirror = self.mirror();
            let snapshot = mirror.habits.clone();
            mirror.habits.retain(|habit| habit.name != name);
            if mirror.habits.len() == snapshot.len() {
                return Err(ClientError::UnknownHabit(name.to_string()));
            }
            snapshot
        };

        let result = self
            .api
            .delete(DeleteHabitParams {
                habit_name: name.to_string(),
            })
            .await;

        if let Err(err) = result {
            self.mirror().habits = snapshot;
            tracing::warn!("Delete of '{}' failed, restored collection: {}", name, err);
            return Err(err);
        }
        Ok(())
    }

    /// Append a habit locally, then create it on the service
    ///
    /// On success the optimistic entry is replaced by the service's record;
    /// on failure it is removed again.
    pub async fn create(&self, params: CreateHabitParams) -> Result<Habit, ClientError> {
        let created_at = match params.created_date {
            Some(millis) => chrono::DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                DomainError::InvalidDate(format!("createdDate out of range: {millis}"))
            })?,
            None => chrono::Utc::now(),
        };
        let completed_days = params
            .completed_dates
            .iter()
            .map(|&millis| self.zone.day_of_millis(millis))
            .collect::<Result<CompletedDays, _>>()?;
        let draft = HabitDraft::new(
            &params.name,
            &params.description,
            &params.color,
            created_at,
            completed_days,
        )?;
        let name = draft.name.clone();

        {
            let mut mirror = self.mirror();
            if mirror.habits.iter().any(|habit| habit.name == name) {
                return Err(ClientError::DuplicateHabit(name));
            }
            mirror
                .habits
                .push(Habit::from_draft(HabitId::from_name(&name), draft));
        }

        let outcome = match self.api.create(params).await {
            Ok(record) => record.into_habit(&self.zone).map_err(ClientError::from),
            Err(err) => Err(err),
        };

        let mut mirror = self.mirror();
        match outcome {
            Ok(habit) => {
                if let Some(slot) = mirror.habit_mut(&name) {
                    *slot = habit.clone();
                }
                Ok(habit)
            }
            Err(err) => {
                mirror.habits.retain(|habit| habit.name != name);
                tracing::warn!("Create of '{}' failed, removed optimistic entry: {}", name, err);
                Err(err)
            }
        }
    }
}
