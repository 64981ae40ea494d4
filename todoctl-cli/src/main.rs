//! todoctl CLI - entry point for the todo CRUD server
//!
//! - `serve`: run the HTTP API
//! - `init-db`: create the schema and exit

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "todoctl",
    author,
    version,
    about = "Todo CRUD API backed by SQLite or PostgreSQL"
)]
struct Cli {
    /// Debug logging, including redacted connection parameters at startup
    #[arg(long, global = true, env = "TODO_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Create the todos table and exit
    InitDb(commands::init_db::InitDbArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so .env values feed clap's env fallbacks
    let dotenv = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    config::log_dotenv(&dotenv);

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, cli.debug).await?,
        Commands::InitDb(args) => commands::run_init_db(args, cli.debug).await?,
    }
    Ok(())
}
