//! todoctl-server: todo CRUD over HTTP
//!
//! A single `todos` table behind a small axum API, stored in either an
//! embedded SQLite file or a PostgreSQL server. The dialect is picked once
//! from configuration and hidden behind [`db::TodoStore`].

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod service;

pub use config::{DatabaseConfig, Dialect, PgConfig, PoolConfig};
pub use db::{bootstrap_schema, open_store, DbError, RetryPolicy, TodoStore};
pub use http::{run_server, ServerConfig, ServerError};
pub use service::TodoService;

/// Everything needed to start serving
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pool: PoolConfig,
    pub schema_retry: RetryPolicy,
}

/// Top-level error for [`serve`]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Build the store, bootstrap the schema, and serve until shutdown.
///
/// A schema bootstrap that exhausts its retries is logged and tolerated:
/// the health endpoint keeps answering and todo routes return 503 while the
/// database is unreachable.
pub async fn serve(options: ServeOptions) -> Result<(), Error> {
    let store = open_store(&options.database, &options.pool)?;

    if !bootstrap_schema(store.as_ref(), &options.schema_retry).await {
        tracing::warn!("Starting without a verified schema; the table will be created on first use");
    }

    run_server(TodoService::new(store), options.server).await?;
    Ok(())
}
