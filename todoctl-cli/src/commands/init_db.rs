//! Schema bootstrap command
//!
//! Creates the `todos` table and exits. Unlike `serve`, exhausting the
//! retries is an error.

use anyhow::{bail, Context, Result};
use clap::Parser;

use todoctl_server::{bootstrap_schema, open_store};

use crate::config::{DatabaseArgs, RetryArgs};

/// Arguments for the init-db command
#[derive(Parser, Debug)]
pub struct InitDbArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    #[command(flatten)]
    pub retry: RetryArgs,
}

pub async fn run_init_db(args: InitDbArgs, debug: bool) -> Result<()> {
    let database = args.db.database_config();
    if debug {
        tracing::debug!(config = %database, "Database connection parameters");
    }

    let store = open_store(&database, &args.db.pool_config())
        .context("Invalid database configuration")?;

    if !bootstrap_schema(store.as_ref(), &args.retry.policy()).await {
        bail!("could not initialize the {} schema", database.dialect());
    }

    println!("Schema ready ({})", database);
    Ok(())
}
