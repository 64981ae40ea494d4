//! HTTP server command
//!
//! Bootstraps the schema (tolerating an unreachable database) and serves the
//! todo API until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use todoctl_server::{ServeOptions, ServerConfig};

use crate::config::{DatabaseArgs, RetryArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "TODO_BIND", default_value = "0.0.0.0:3001")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub db: DatabaseArgs,

    #[command(flatten)]
    pub retry: RetryArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, debug: bool) -> Result<()> {
    let database = args.db.database_config();

    tracing::info!("Starting Todo CRUD API on {}", args.bind);
    if debug {
        tracing::debug!(config = %database, "Database connection parameters");
    }

    let options = ServeOptions {
        server: ServerConfig {
            bind_addr: args.bind,
        },
        database,
        pool: args.db.pool_config(),
        schema_retry: args.retry.policy(),
    };

    // Run server (blocks until shutdown)
    todoctl_server::serve(options)
        .await
        .context("Server error")?;

    Ok(())
}
