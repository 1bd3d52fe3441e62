//! Domain module containing the habit model and calendar logic
//!
//! This module defines the core entities (Habit, CompletedDays, DayKey) and
//! the month-grid aggregation. Nothing in here performs I/O.

pub mod calendar;
pub mod habit;
pub mod record;
pub mod types;

// Re-export public types for easy access
pub use calendar::*;
pub use habit::*;
pub use record::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
