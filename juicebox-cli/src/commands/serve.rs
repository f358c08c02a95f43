//! HTTP server command
//!
//! Runs the blogging API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use juicebox_server::http::server::DEFAULT_REQUESTER_HEADER;
use juicebox_server::{run_server, ServerConfig};

use crate::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "JUICEBOX_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long, env = "JUICEBOX_CORS_PERMISSIVE")]
    pub cors_permissive: bool,

    /// Trusted header carrying the authenticated username, set by the fronting proxy
    #[arg(long, env = "JUICEBOX_REQUESTER_HEADER", default_value = DEFAULT_REQUESTER_HEADER)]
    pub requester_header: String,
}

impl ServeArgs {
    fn server_config(self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            requester_header: self.requester_header.to_ascii_lowercase(),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, database: &DatabaseArgs) -> Result<()> {
    tracing::info!("Starting juicebox server on {}", args.bind);

    let pool = super::connect(database).await?;

    // Blocks until shutdown
    run_server(pool, args.server_config())
        .await
        .context("Server error")?;

    Ok(())
}
