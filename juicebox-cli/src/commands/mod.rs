//! Command implementations for the juicebox CLI

pub mod db;
pub mod serve;

use anyhow::{Context, Result};
use juicebox_server::db::PgPool;
use juicebox_server::{create_pool, PoolSettings};

use crate::DatabaseArgs;

// Re-export dispatcher functions for flat access from main.rs
pub use db::run_db;
pub use serve::run_serve;

/// Connect using the shared `--database-url` / `--max-connections` settings.
async fn connect(database: &DatabaseArgs) -> Result<PgPool> {
    let settings = PoolSettings::with_max_connections(database.max_connections);

    create_pool(&database.database_url, settings)
        .await
        .context("Failed to create database pool")
}
