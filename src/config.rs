//! Command-line and environment configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use levelr_core::Database;

use crate::generation::{GeminiBackend, GenerationBackend, DEFAULT_GEMINI_BASE_URL};

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// SQLite database file (defaults to the platform data directory)
    #[arg(long = "db", env = "LEVELR_DB")]
    pub db_path: Option<PathBuf>,
}

impl StoreArgs {
    /// Open and migrate the configured database.
    pub fn open(&self) -> anyhow::Result<Database> {
        let db = match &self.db_path {
            Some(path) => Database::open(path)?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

#[derive(Debug, Clone, Args)]
pub struct GeminiArgs {
    /// Gemini API key; without it every plan falls back to placeholders
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Timeout for one generation call, in seconds
    #[arg(long, env = "GEMINI_TIMEOUT_SECS", default_value_t = 60)]
    pub gemini_timeout_secs: u64,
}

impl GeminiArgs {
    pub fn backend(&self) -> anyhow::Result<Option<Arc<dyn GenerationBackend>>> {
        let Some(key) = self.gemini_api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            tracing::warn!("GEMINI_API_KEY is not set; level plans will use placeholders");
            return Ok(None);
        };
        let backend = GeminiBackend::new(
            self.gemini_base_url.as_str(),
            key,
            Duration::from_secs(self.gemini_timeout_secs),
        )?;
        Ok(Some(Arc::new(backend)))
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "LEVELR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for HTTP API
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub gemini: GeminiArgs,
}

impl ServeArgs {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Args)]
pub struct McpArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn gemini_defaults() {
        let cli = TestCli::parse_from(["levelr", "--gemini-api-key", ""]);
        assert_eq!(cli.serve.gemini.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(cli.serve.gemini.gemini_timeout_secs, 60);
    }

    #[test]
    fn blank_api_key_means_no_backend() {
        let cli = TestCli::parse_from(["levelr", "--gemini-api-key", " "]);
        assert!(cli.serve.gemini.backend().unwrap().is_none());
    }

    #[test]
    fn explicit_flags_override() {
        let cli = TestCli::parse_from([
            "levelr", "--host", "0.0.0.0", "--port", "8080", "--db", "/tmp/x.db",
        ]);
        assert_eq!(cli.serve.bind_addr(), "0.0.0.0:8080");
        assert_eq!(cli.serve.store.db_path, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn api_key_builds_a_backend() {
        let cli = TestCli::parse_from(["levelr", "--gemini-api-key", "secret"]);
        assert!(cli.serve.gemini.backend().unwrap().is_some());
    }
}
