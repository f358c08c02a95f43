//! juicebox-server: blogging API over Postgres
//!
//! Users write posts, posts carry tags, and tag listings are filtered by
//! who is asking. The data-access layer lives in [`db`], the axum surface
//! in [`http`].

pub mod db;
pub mod http;
pub mod visibility;

pub use db::{create_lazy_pool, create_pool, DbError, PoolSettings};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
