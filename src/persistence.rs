//! SQLite-backed key-value persistence for settings, stats and tasks.
//!
//! Every record lives under its own key as a JSON document. Loads never fail:
//! missing or corrupt records yield defaults. Saves are best-effort and only
//! log on failure.

use crate::models::{Settings, Stats, Task};
use chrono::{Local, NaiveDate};
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create database directory")]
    DirectoryCreation,
}

/// Minimal durable string store the gateway is written against.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
    fn remove(&self, key: &str) -> Result<(), DatabaseError>;
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database in the platform data directory.
    pub fn open_default() -> Result<Self, DatabaseError> {
        Self::open(&Self::db_path())
    }

    /// Opens (or creates) a database file, initializing tables if needed.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|_| DatabaseError::DirectoryCreation)?;
        }

        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing).
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    pub fn db_path() -> PathBuf {
        ProjectDirs::from("com", "focusbar", "Focusbar")
            .map(|dirs| dirs.data_dir().join("focusbar.db"))
            .unwrap_or_else(|| PathBuf::from("focusbar.db"))
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// The three independent records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Settings,
    Stats,
    Tasks,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [Self::Settings, Self::Stats, Self::Tasks];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Stats => "stats",
            Self::Tasks => "tasks",
        }
    }
}

/// Persistence gateway over a key-value store.
pub struct Storage {
    store: Box<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    fn read(&self, key: StorageKey) -> Option<String> {
        match self.store.get(key.as_str()) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Could not read {} from storage: {}", key.as_str(), e);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(DatabaseError::from)
            .and_then(|json| self.store.set(key.as_str(), &json));

        if let Err(e) = result {
            log::warn!("Could not save {} to storage: {}", key.as_str(), e);
        }
    }

    /// Loads settings merged over defaults. Never fails.
    pub fn load_settings(&self) -> Settings {
        let Some(json) = self.read(StorageKey::Settings) else {
            return Settings::default();
        };

        match serde_json::from_str(&json) {
            Ok(value) => Settings::from_stored(&value),
            Err(e) => {
                log::warn!("Ignoring corrupt settings record: {}", e);
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) {
        self.write(StorageKey::Settings, settings);
    }

    /// Loads today's stats, resetting them if they were stored on another day.
    pub fn load_stats(&self) -> Stats {
        self.load_stats_for(Local::now().date_naive())
    }

    pub fn load_stats_for(&self, today: NaiveDate) -> Stats {
        let stored = self
            .read(StorageKey::Stats)
            .and_then(|json| match serde_json::from_str::<Stats>(&json) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    log::warn!("Ignoring corrupt stats record: {}", e);
                    None
                }
            });

        Stats::for_today(stored, today)
    }

    pub fn save_stats(&self, stats: &Stats) {
        self.write(StorageKey::Stats, stats);
    }

    /// Loads the task list, empty if missing or corrupt.
    pub fn load_tasks(&self) -> Vec<Task> {
        let Some(json) = self.read(StorageKey::Tasks) else {
            return Vec::new();
        };

        match serde_json::from_str(&json) {
            Ok(tasks) => tasks,
            Err(e) => {
                log::warn!("Ignoring corrupt tasks record: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save_tasks(&self, tasks: &[Task]) {
        self.write(StorageKey::Tasks, tasks);
    }

    /// Removes all three records.
    pub fn reset_all(&self) {
        for key in StorageKey::ALL {
            if let Err(e) = self.store.remove(key.as_str()) {
                log::warn!("Could not clear {} from storage: {}", key.as_str(), e);
            }
        }
    }
}

/// A store whose every operation fails, for exercising best-effort paths.
#[cfg(test)]
pub struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, DatabaseError> {
        Err(DatabaseError::DirectoryCreation)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), DatabaseError> {
        Err(DatabaseError::DirectoryCreation)
    }

    fn remove(&self, _key: &str) -> Result<(), DatabaseError> {
        Err(DatabaseError::DirectoryCreation)
    }
}
