//! Levelr server: HTTP API, MCP server and level plan generation on top of
//! `levelr-core`.

pub mod api;
pub mod config;
pub mod generation;
pub mod mcp;

pub use levelr_core::{db, models, plan, progression, rewards};
