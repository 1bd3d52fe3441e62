//! JSON document backend for anonymous callers
//!
//! The whole collection lives in one document. Every operation reads the
//! document, mutates it in memory and writes the whole thing back through
//! a temp file and an atomic rename, so a failed write leaves the previous
//! document untouched.
//!
//! Writers inside this process are serialized by a mutex. Its guard moves
//! into the blocking write, so the lock stays held until the rename has
//! landed even if the calling future is dropped mid-write. Writers in other
//! processes are not coordinated and the last one to rename wins; this
//! backend is the demo fallback and assumes a single writer.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{Caller, DayKey, DayZone, Habit, HabitDraft, HabitId, HabitRecord};
use crate::storage::{HabitStore, StorageError};

/// On-disk layout: `{ "habits": [ ... ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitDocument {
    #[serde(default)]
    pub habits: Vec<HabitRecord>,
}

/// File-backed habit store
pub struct FileStore {
    path: PathBuf,
    zone: DayZone,
    // Held for the full read-modify-write cycle
    lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, zone: DayZone) -> Self {
        Self {
            path: path.into(),
            zone,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document; a missing file is an empty collection
    async fn load(&self) -> Result<Vec<Habit>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No habit document at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };

        let document: HabitDocument =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        document
            .habits
            .into_iter()
            .map(|record| record.into_habit(&self.zone).map_err(StorageError::from))
            .collect()
    }

    async fn lock_for_write(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.lock).lock_owned().await
    }

    /// Replace the document with `habits`, releasing `guard` once the
    /// rename is done
    async fn save(
        &self,
        habits: &[Habit],
        guard: OwnedMutexGuard<()>,
    ) -> Result<(), StorageError> {
        let document = HabitDocument {
            habits: habits
                .iter()
                .map(|habit| {
                    // The file format has no separate id
                    let mut record = HabitRecord::from_habit(habit, &self.zone);
                    record.id = None;
                    record
                })
                .collect(),
        };
        let payload = serde_json::to_vec_pretty(&document)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let written = write_atomically(&path, &payload);
            drop(guard);
            written
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }

    fn find<'a>(habits: &'a mut [Habit], name: &str) -> Option<&'a mut Habit> {
        habits.iter_mut().find(|habit| habit.name == name)
    }
}

/// Write `payload` next to `path` and rename it into place
fn write_atomically(path: &Path, payload: &[u8]) -> Result<(), StorageError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| StorageError::io(&parent, e))?;

    let mut temp =
        tempfile::NamedTempFile::new_in(&parent).map_err(|e| StorageError::io(&parent, e))?;
    temp.write_all(payload).map_err(|e| StorageError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StorageError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;
    Ok(())
}

#[async_trait]
impl HabitStore for FileStore {
    async fn list(&self, _caller: &Caller) -> Result<Vec<Habit>, StorageError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn create(&self, _caller: &Caller, draft: HabitDraft) -> Result<Habit, StorageError> {
        let guard = self.lock_for_write().await;
        let mut habits = self.load().await?;

        if habits.iter().any(|habit| habit.name == draft.name) {
            return Err(StorageError::DuplicateHabit { name: draft.name });
        }

        let habit = Habit::from_draft(HabitId::from_name(&draft.name), draft);
        habits.push(habit.clone());
        self.save(&habits, guard).await?;

        tracing::debug!("Created habit '{}' in {}", habit.name, self.path.display());
        Ok(habit)
    }

    async fn delete(&self, _caller: &Caller, name: &str) -> Result<(), StorageError> {
        let guard = self.lock_for_write().await;
        let mut habits = self.load().await?;

        let before = habits.len();
        habits.retain(|habit| habit.name != name);
        if habits.len() == before {
            return Err(StorageError::HabitNotFound {
                name: name.to_string(),
            });
        }

        // Completions are inline, so they disappear with the habit
        self.save(&habits, guard).await?;
        tracing::debug!("Deleted habit '{}' from {}", name, self.path.display());
        Ok(())
    }

    async fn toggle(
        &self,
        _caller: &Caller,
        name: &str,
        day: DayKey,
    ) -> Result<bool, StorageError> {
        let guard = self.lock_for_write().await;
        let mut habits = self.load().await?;

        let habit = Self::find(&mut habits, name).ok_or_else(|| StorageError::HabitNotFound {
            name: name.to_string(),
        })?;
        let completed = habit.completed_days.toggle(day);

        self.save(&habits, guard).await?;
        tracing::debug!("Toggled '{}' on {} -> {}", name, day, completed);
        Ok(completed)
    }
}
