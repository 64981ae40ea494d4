//! Database and schema options shared by the subcommands
//!
//! Every option can come from a flag or the environment. A `.env` file in
//! the current directory is loaded first and never overrides variables that
//! are already set.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use todoctl_server::{DatabaseConfig, PgConfig, PoolConfig, RetryPolicy};
use tracing::{debug, warn};

/// Load `.env` from the current directory, if present.
///
/// Runs before tracing is initialised, so the outcome is returned and
/// logged later with [`log_dotenv`].
pub fn load_dotenv() -> dotenvy::Result<PathBuf> {
    dotenvy::dotenv()
}

pub fn log_dotenv(outcome: &dotenvy::Result<PathBuf>) {
    match outcome {
        Ok(path) => debug!("Loaded .env from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found, using environment only"),
        Err(e) => warn!("Failed to load .env: {}", e),
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialectArg {
    Sqlite,
    Postgres,
}

/// Where to store todos
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Storage backend
    #[arg(long, env = "TODO_DB_DIALECT", value_enum, default_value = "sqlite")]
    pub dialect: DialectArg,

    /// SQLite database file (sqlite dialect)
    #[arg(long, env = "TODO_SQLITE_PATH", default_value = "todos.db")]
    pub sqlite_path: PathBuf,

    /// Full PostgreSQL URL; overrides the individual --pg-* options
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// PostgreSQL host
    #[arg(long, env = "POSTGRES_HOST", default_value = "localhost")]
    pub pg_host: String,

    /// PostgreSQL port
    #[arg(long, env = "POSTGRES_PORT", default_value_t = 5432)]
    pub pg_port: u16,

    /// PostgreSQL user
    #[arg(long, env = "POSTGRES_USER", default_value = "postgres")]
    pub pg_user: String,

    /// PostgreSQL password
    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    pub pg_password: Option<String>,

    /// PostgreSQL database name
    #[arg(long, env = "POSTGRES_DB", default_value = "todos")]
    pub pg_db: String,

    /// Maximum pooled connections
    #[arg(long, env = "TODO_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds to wait for a connection before reporting the database unavailable
    #[arg(long, env = "TODO_DB_CONNECT_TIMEOUT_SECS", default_value_t = 5)]
    pub connect_timeout_secs: u64,
}

impl DatabaseArgs {
    pub fn database_config(&self) -> DatabaseConfig {
        match self.dialect {
            DialectArg::Sqlite => DatabaseConfig::Sqlite {
                path: self.sqlite_path.clone(),
            },
            DialectArg::Postgres => DatabaseConfig::Postgres(PgConfig {
                url: self.database_url.clone(),
                host: self.pg_host.clone(),
                port: self.pg_port,
                user: self.pg_user.clone(),
                password: self.pg_password.clone(),
                dbname: self.pg_db.clone(),
            }),
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.max_connections.max(1),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
        }
    }
}

/// Schema bootstrap retry options
#[derive(Args, Debug, Clone)]
pub struct RetryArgs {
    /// Attempts to create the schema before giving up
    #[arg(long, env = "TODO_SCHEMA_RETRIES", default_value_t = 5)]
    pub schema_retries: u32,

    /// Delay before the first retry, in milliseconds (doubles each retry)
    #[arg(long, env = "TODO_SCHEMA_RETRY_DELAY_MS", default_value_t = 500)]
    pub schema_retry_delay_ms: u64,
}

impl RetryArgs {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.schema_retries,
            delay: Duration::from_millis(self.schema_retry_delay_ms),
        }
    }
}
