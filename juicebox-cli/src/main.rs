//! juicebox CLI - run the blogging API and manage its database
//!
//! - `serve`: start the HTTP API
//! - `db rebuild`: drop, recreate and seed the development database
//! - `db check`: read seeded data back through the repositories

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

/// Local development database, same name the seed data was written for.
const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/juicebox-dev";

#[derive(Parser, Debug)]
#[command(
    name = "juicebox",
    author,
    version,
    about = "Blogging API with users, posts and tags over Postgres"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    database: DatabaseArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Connection settings shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Postgres connection string
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = DEFAULT_DATABASE_URL
    )]
    pub database_url: String,

    /// Maximum pooled connections
    #[arg(
        long,
        global = true,
        env = "JUICEBOX_MAX_CONNECTIONS",
        default_value_t = juicebox_server::db::pool::DEFAULT_MAX_CONNECTIONS
    )]
    pub max_connections: u32,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Development database maintenance (rebuild, check)
    Db(commands::db::DbArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables take precedence
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug })
        .context("failed to initialize tracing")?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &cli.database).await?,
        Commands::Db(args) => commands::run_db(args, &cli.database).await?,
    }

    Ok(())
}
