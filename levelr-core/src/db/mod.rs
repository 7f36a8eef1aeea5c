//! SQLite document store.
//!
//! One connection behind a mutex, shared by cloning the handle. Goals are
//! stored as documents: scalar columns for filtering plus the embedded level
//! list as a JSON column.

mod goals;
mod schema;
mod users;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;

use crate::progression::ProgressionError;

pub use goals::CompletionOutcome;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Failure of a read-modify-write on a single goal document.
#[derive(Debug, thiserror::Error)]
pub enum GoalUpdateError {
    #[error("Goal not found")]
    GoalNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("database lock poisoned")]
    Poisoned,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening database at {}", path.display()))?;
        tracing::debug!("Opened database at {}", path.display());
        Self::from_connection(conn)
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn default_path() -> Result<std::path::PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "levelr")
            .ok_or_else(|| anyhow!("could not determine data directory"))?;
        Ok(dirs.data_dir().join("levelr.db"))
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(schema::SCHEMA)?;
        tracing::debug!("Database schema up to date");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database lock poisoned"))
    }

    fn lock_for_update(&self) -> Result<MutexGuard<'_, Connection>, GoalUpdateError> {
        self.conn.lock().map_err(|_| GoalUpdateError::Poisoned)
    }
}

fn parse_uuid(idx: usize, s: String) -> rusqlite::Result<uuid::Uuid> {
    uuid::Uuid::parse_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_timestamp(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}
