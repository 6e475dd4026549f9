//! Task list and free-form notes.
//!
//! Tasks are stored as a JSON array under `tasks`; notes are the raw text
//! under `notes`. Both are rewritten in full on every change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ValidationError};
use crate::storage::kv::{read_json, write_json, KvStore};

pub const TASKS_KEY: &str = "tasks";
pub const NOTES_KEY: &str = "notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Creation time in epoch milliseconds; unique within a list.
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct TaskList<S: KvStore> {
    store: S,
    tasks: Vec<Task>,
}

impl<S: KvStore> TaskList<S> {
    pub fn load(store: S) -> Self {
        let tasks = match read_json::<Vec<Task>>(&store, TASKS_KEY) {
            Ok(Some(tasks)) => tasks,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("could not load tasks, starting empty: {e}");
                Vec::new()
            }
        };
        debug!(count = tasks.len(), "tasks loaded");
        Self { store, tasks }
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Display order: open tasks first, newest first within each group.
    pub fn sorted(&self) -> Vec<&Task> {
        let mut sorted: Vec<&Task> = self.tasks.iter().collect();
        sorted.sort_by(|a, b| {
            a.completed
                .cmp(&b.completed)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        sorted
    }

    /// Add a task created `now`.
    ///
    /// # Errors
    /// Rejects text that is empty after trimming.
    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> Result<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::Empty("task text".into()).into());
        }

        let mut id = now.timestamp_millis();
        if let Some(max) = self.tasks.iter().map(|t| t.id).max() {
            id = id.max(max + 1);
        }

        self.tasks.push(Task {
            id,
            text: text.to_string(),
            completed: false,
            timestamp: now,
        });
        self.save();
        debug!(id, "task added");
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Flip a task's completed flag and return the new value.
    pub fn toggle(&mut self, id: i64) -> Result<bool> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ValidationError::UnknownTask(id))?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.save();
        debug!(id, completed, "task toggled");
        Ok(completed)
    }

    pub fn delete(&mut self, id: i64) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(ValidationError::UnknownTask(id))?;
        let removed = self.tasks.remove(index);
        self.save();
        debug!(id, "task deleted");
        Ok(removed)
    }

    pub fn notes(&self) -> String {
        match self.store.get(NOTES_KEY) {
            Ok(notes) => notes.unwrap_or_default(),
            Err(e) => {
                warn!("could not load notes: {e}");
                String::new()
            }
        }
    }

    pub fn set_notes(&self, text: &str) -> Result<()> {
        self.store.set(NOTES_KEY, text)
    }

    fn save(&self) {
        if let Err(e) = write_json(&self.store, TASKS_KEY, &self.tasks) {
            warn!("tasks kept in memory only: {e}");
        }
    }
}
