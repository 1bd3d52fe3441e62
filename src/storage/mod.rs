//! Storage layer for persisting habit data
//!
//! Two interchangeable backends implement [`HabitStore`]: a single JSON
//! document for anonymous callers and a normalized SQLite database for
//! authenticated ones. Both run the same toggle contract.

pub mod file;
pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use file::*;
pub use sqlite::*;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Caller, DayKey, DomainError, Habit, HabitDraft};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit document {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Stored data is invalid: {0}")]
    InvalidData(#[from] DomainError),

    #[error("Habit not found: {name}")]
    HabitNotFound { name: String },

    #[error("A habit named '{name}' already exists")]
    DuplicateHabit { name: String },

    #[error("The relational store requires an owner")]
    MissingOwner,

    #[error("Storage task failed: {0}")]
    Task(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Capability set shared by both storage backends
///
/// Every method takes the caller so an owner-scoped backend can filter by
/// it; the file backend serves one owner-agnostic collection and ignores
/// the owner.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// All habits visible to `caller`, in insertion order regardless of
    /// their `created_at`
    async fn list(&self, caller: &Caller) -> Result<Vec<Habit>, StorageError>;

    /// Persist a new habit; names must be unique per owner
    async fn create(&self, caller: &Caller, draft: HabitDraft) -> Result<Habit, StorageError>;

    /// Remove a habit together with all its completions
    async fn delete(&self, caller: &Caller, name: &str) -> Result<(), StorageError>;

    /// Flip completion of `day`, returning the new membership
    ///
    /// Fails with [`StorageError::HabitNotFound`] without mutating anything
    /// when no habit has that name.
    async fn toggle(&self, caller: &Caller, name: &str, day: DayKey) -> Result<bool, StorageError>;
}
