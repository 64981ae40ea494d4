//! Database connection pool management
//!
//! The pool is built once at startup and handed to the store. It connects
//! lazily, so a database that is down at startup does not stop the process;
//! each operation fails with `DbError::Unavailable` until it comes back.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;

use super::{DbError, PgStore, SqliteStore, TodoStore};
use crate::config::{sqlite_connect_options, DatabaseConfig, PoolConfig};

/// Build the store for the configured dialect.
///
/// # Errors
///
/// Returns an error only if the configuration itself is invalid (e.g. an
/// unparseable database URL). Reachability is not checked here.
///
/// # Example
///
/// ```ignore
/// let store = open_store(&config, &PoolConfig::default())?;
/// bootstrap_schema(store.as_ref(), &RetryPolicy::default()).await;
/// ```
pub fn open_store(
    config: &DatabaseConfig,
    pool_config: &PoolConfig,
) -> Result<Arc<dyn TodoStore>, DbError> {
    tracing::debug!(
        dialect = %config.dialect(),
        max_connections = pool_config.max_connections,
        connect_timeout_ms = pool_config.connect_timeout.as_millis() as u64,
        "creating connection pool"
    );

    let store: Arc<dyn TodoStore> = match config {
        DatabaseConfig::Sqlite { path } => {
            let pool = SqlitePoolOptions::new()
                .max_connections(pool_config.max_connections)
                .acquire_timeout(pool_config.connect_timeout)
                .connect_lazy_with(sqlite_connect_options(path));
            Arc::new(SqliteStore::new(pool))
        }
        DatabaseConfig::Postgres(pg) => {
            let options = pg.connect_options().map_err(DbError::Sqlx)?;
            let pool = PgPoolOptions::new()
                .max_connections(pool_config.max_connections)
                .acquire_timeout(pool_config.connect_timeout)
                .connect_lazy_with(options);
            Arc::new(PgStore::new(pool))
        }
    };

    Ok(store)
}
