//! Task checklist bookkeeping.

use crate::models::Task;
use chrono::{DateTime, Utc};

/// Outcome of toggling a task, used to keep the completed-task stat in step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Completed,
    Reopened,
}

/// Ordered, append-only list of tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Appends a task. Returns `None` when the trimmed text is empty.
    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> Option<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let task = Task {
            id: self.next_id(now),
            text: text.to_string(),
            completed: false,
            created_at: now,
        };
        self.tasks.push(task);
        self.tasks.last()
    }

    /// Ids are creation timestamps in milliseconds, bumped past any existing id.
    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        match self.tasks.iter().map(|t| t.id).max() {
            Some(max) if max >= candidate => max
                .checked_add(1)
                .unwrap_or_else(|| self.free_id_below(candidate)),
            _ => candidate,
        }
    }

    /// Highest unused id at or below `start`, for when the top of the range is taken.
    fn free_id_below(&self, start: i64) -> i64 {
        (i64::MIN..=start)
            .rev()
            .find(|id| self.get(*id).is_none())
            .unwrap_or(start)
    }

    /// Flips the completed flag of a task. Returns `None` for unknown ids.
    pub fn toggle(&mut self, id: i64) -> Option<Toggled> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        Some(if task.completed {
            Toggled::Completed
        } else {
            Toggled::Reopened
        })
    }

    /// Removes a task. Returns false for unknown ids.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Number of tasks not yet completed.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
