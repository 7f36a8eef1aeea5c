//! Core library for Levelr.
//!
//! Domain models, the reward schedule, the level progression state machine
//! and the SQLite document store, independent of any transport layer
//! (HTTP, MCP, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use levelr_core::db::Database;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let goals = db.list_goals(uuid::Uuid::new_v4())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod models;
pub mod plan;
pub mod progression;
pub mod rewards;

// Re-export commonly used types at crate root
pub use db::{CompletionOutcome, Database, GoalUpdateError};
pub use progression::{LevelCompletion, ProgressionError};
pub use rewards::Reward;
