//! Habit operations exposed to callers
//!
//! Each operation lives in its own module with its request and response
//! types. [`HabitService`] picks the storage backend for a caller once and
//! hands it to the operation, so no operation branches on identity itself.

pub mod calendar;
pub mod create;
pub mod delete;
pub mod list;
pub mod toggle;

pub use calendar::*;
pub use create::*;
pub use delete::*;
pub use list::*;
pub use toggle::*;

use thiserror::Error;

use crate::domain::{Caller, DayZone, DomainError};
use crate::storage::{FileStore, HabitStore, SqliteStore, StorageError};

/// Failures reported to callers
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed or missing request fields; nothing was mutated
    #[error("{0}")]
    Validation(String),

    /// The operation needs an owner identity
    #[error("Authentication required")]
    Unauthorized,

    #[error("Habit not found: {name}")]
    NotFound { name: String },

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::HabitNotFound { name } => ServiceError::NotFound { name },
            StorageError::DuplicateHabit { .. } => ServiceError::Validation(err.to_string()),
            StorageError::MissingOwner => ServiceError::Unauthorized,
            other => ServiceError::Storage(other),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

/// Front door for every habit operation
///
/// Holds both backends and the day convention. There is no cache: each
/// call reads the backend's current state.
pub struct HabitService {
    file: FileStore,
    relational: SqliteStore,
    zone: DayZone,
}

impl HabitService {
    pub fn new(file: FileStore, relational: SqliteStore, zone: DayZone) -> Self {
        Self {
            file,
            relational,
            zone,
        }
    }

    pub fn zone(&self) -> DayZone {
        self.zone
    }

    /// Backend serving `caller`: relational when authenticated, file otherwise
    pub fn store_for(&self, caller: &Caller) -> &dyn HabitStore {
        if caller.is_authenticated() {
            &self.relational
        } else {
            &self.file
        }
    }

    pub async fn list(&self, caller: &Caller) -> Result<ListHabitsResponse, ServiceError> {
        require_owner(caller)?;
        list_habits(self.store_for(caller), caller, &self.zone).await
    }

    pub async fn create(
        &self,
        caller: &Caller,
        params: CreateHabitParams,
    ) -> Result<CreateHabitResponse, ServiceError> {
        create_habit(self.store_for(caller), caller, &self.zone, params).await
    }

    pub async fn toggle(
        &self,
        caller: &Caller,
        params: ToggleParams,
    ) -> Result<ToggleResponse, ServiceError> {
        toggle_completion(self.store_for(caller), caller, &self.zone, params).await
    }

    pub async fn delete(
        &self,
        caller: &Caller,
        params: DeleteHabitParams,
    ) -> Result<DeleteHabitResponse, ServiceError> {
        delete_habit(self.store_for(caller), caller, params).await
    }

    pub async fn calendar(
        &self,
        caller: &Caller,
        params: CalendarParams,
    ) -> Result<CalendarResponse, ServiceError> {
        require_owner(caller)?;
        month_calendar(self.store_for(caller), caller, params).await
    }
}

fn require_owner(caller: &Caller) -> Result<(), ServiceError> {
    if caller.is_authenticated() {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Validate a habit name used as a lookup key
fn habit_name(raw: &str) -> Result<&str, ServiceError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("habitName cannot be empty".to_string()));
    }
    Ok(name)
}
