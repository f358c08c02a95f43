//! Development database commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use juicebox_server::db::seed;

use crate::DatabaseArgs;

#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommands,
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Drop every table, recreate the schema and seed sample users and posts
    Rebuild,
    /// Read users, posts and tags back and report counts
    Check,
}

pub async fn run_db(args: DbArgs, database: &DatabaseArgs) -> Result<()> {
    let pool = super::connect(database).await?;

    match args.command {
        DbCommands::Rebuild => {
            tracing::info!("Starting to rebuild database...");
            let summary = seed::rebuild(&pool)
                .await
                .context("Failed to rebuild database")?;
            println!(
                "Rebuilt database: {} users, {} posts",
                summary.users, summary.posts
            );
        }
        DbCommands::Check => {
            let summary = seed::check(&pool)
                .await
                .context("Database check failed")?;
            println!(
                "users: {}\nposts: {}\ntags: {}\nposts tagged {}: {}",
                summary.users,
                summary.posts,
                summary.tags,
                seed::SEED_TAG,
                summary.posts_with_seed_tag
            );
        }
    }

    pool.close().await;
    Ok(())
}
