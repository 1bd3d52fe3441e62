//! SQLite implementation of the habit store
//!
//! Habits and completions are separate owner-scoped tables. Each mutation
//! runs inside a single `BEGIN IMMEDIATE` transaction, so concurrent
//! toggles on the same habit and day cannot both observe "absent", and a
//! delete never leaves completions pointing at a missing habit.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};

use crate::domain::{
    Caller, CompletedDays, DayKey, Habit, HabitColor, HabitDraft, HabitId, OwnerKey,
};
use crate::storage::{migrations, HabitStore, StorageError};

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex and is only touched from blocking
/// worker threads, keeping rusqlite off the async executor.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and run migrations
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let store = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {}", db_path.display());
        Ok(store)
    }

    /// Private in-memory database, used by tests and ephemeral servers
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| {
                StorageError::Connection(format!("Failed to enable foreign keys: {}", e))
            })?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| StorageError::Connection(format!("Failed to set busy timeout: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on a blocking thread
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::Connection("connection mutex poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }

    fn owner_of(caller: &Caller) -> Result<OwnerKey, StorageError> {
        caller.owner().cloned().ok_or(StorageError::MissingOwner)
    }

    fn find_habit_id(
        conn: &Connection,
        owner: &OwnerKey,
        name: &str,
    ) -> Result<Option<String>, StorageError> {
        let id = conn
            .query_row(
                "SELECT id FROM habits WHERE owner = ?1 AND name = ?2",
                params![owner.as_str(), name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn parse_created_at(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn parse_day(idx: usize, raw: &str) -> rusqlite::Result<DayKey> {
        raw.parse::<DayKey>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn load_habits(conn: &Connection, owner: &OwnerKey) -> Result<Vec<Habit>, StorageError> {
        let mut days_by_habit: HashMap<String, CompletedDays> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                "SELECT c.habit_id, c.day
                 FROM completions c JOIN habits h ON h.id = c.habit_id
                 WHERE h.owner = ?1",
            )?;
            let rows = stmt.query_map(params![owner.as_str()], |row| {
                let habit_id: String = row.get(0)?;
                let day: String = row.get(1)?;
                Ok((habit_id, Self::parse_day(1, &day)?))
            })?;
            for row in rows {
                let (habit_id, day) = row?;
                days_by_habit.entry(habit_id).or_default().set(day, true);
            }
        }

        let mut stmt = conn.prepare(
            "SELECT id, name, description, color, created_at
             FROM habits WHERE owner = ?1
             ORDER BY rowid",
        )?;
        let habit_iter = stmt.query_map(params![owner.as_str()], |row| {
            let id: String = row.get(0)?;
            let color: String = row.get(3)?;
            let created_at: String = row.get(4)?;

            Ok(Habit {
                id: HabitId(id),
                name: row.get(1)?,
                description: row.get(2)?,
                color: HabitColor::from_hex(&color),
                created_at: Self::parse_created_at(4, &created_at)?,
                completed_days: CompletedDays::new(),
            })
        })?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            let mut habit = habit?;
            if let Some(days) = days_by_habit.remove(habit.id.as_str()) {
                habit.completed_days = days;
            }
            habits.push(habit);
        }

        Ok(habits)
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

#[async_trait]
impl HabitStore for SqliteStore {
    async fn list(&self, caller: &Caller) -> Result<Vec<Habit>, StorageError> {
        let owner = Self::owner_of(caller)?;
        self.with_conn(move |conn| Self::load_habits(conn, &owner)).await
    }

    async fn create(&self, caller: &Caller, draft: HabitDraft) -> Result<Habit, StorageError> {
        let owner = Self::owner_of(caller)?;

        self.with_conn(move |conn| {
            let id = HabitId::generate();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let inserted = tx.execute(
                "INSERT INTO habits (id, owner, name, description, color, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.as_str(),
                    owner.as_str(),
                    draft.name,
                    draft.description,
                    HabitColor::hex_for_token(&draft.color),
                    draft.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => {
                    return Err(StorageError::DuplicateHabit { name: draft.name });
                }
                Err(e) => return Err(e.into()),
            }

            {
                let mut stmt =
                    tx.prepare("INSERT INTO completions (habit_id, day) VALUES (?1, ?2)")?;
                for day in draft.completed_days.iter() {
                    stmt.execute(params![id.as_str(), day.to_string()])?;
                }
            }
            tx.commit()?;

            tracing::debug!("Created habit: {} ({})", draft.name, id);
            Ok(Habit::from_draft(id, draft))
        })
        .await
    }

    async fn delete(&self, caller: &Caller, name: &str) -> Result<(), StorageError> {
        let owner = Self::owner_of(caller)?;
        let name = name.to_string();

        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let habit_id = Self::find_habit_id(&tx, &owner, &name)?
                .ok_or_else(|| StorageError::HabitNotFound { name: name.clone() })?;

            // Children first so no completion ever references a missing habit
            let removed =
                tx.execute("DELETE FROM completions WHERE habit_id = ?1", params![habit_id])?;
            tx.execute("DELETE FROM habits WHERE id = ?1", params![habit_id])?;
            tx.commit()?;

            tracing::debug!("Deleted habit: {} ({}), {} completions", name, habit_id, removed);
            Ok(())
        })
        .await
    }

    async fn toggle(&self, caller: &Caller, name: &str, day: DayKey) -> Result<bool, StorageError> {
        let owner = Self::owner_of(caller)?;
        let name = name.to_string();

        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let habit_id = Self::find_habit_id(&tx, &owner, &name)?
                .ok_or_else(|| StorageError::HabitNotFound { name: name.clone() })?;

            let day_str = day.to_string();
            let removed = tx.execute(
                "DELETE FROM completions WHERE habit_id = ?1 AND day = ?2",
                params![habit_id, day_str],
            )?;
            let completed = if removed == 0 {
                tx.execute(
                    "INSERT INTO completions (habit_id, day) VALUES (?1, ?2)",
                    params![habit_id, day_str],
                )?;
                true
            } else {
                false
            };
            tx.commit()?;

            tracing::debug!("Toggled habit {} on {} -> {}", habit_id, day_str, completed);
            Ok(completed)
        })
        .await
    }
}
