//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Pool is created once and injected into each repository
//! - Rely on DB constraints for uniqueness, `ON CONFLICT DO NOTHING` instead of check-then-insert
//! - Column updates come from typed optional fields, never from caller-supplied names

pub mod pool;
pub mod repos;
pub mod schema;
pub mod seed;

pub use pool::{create_lazy_pool, create_pool, PoolSettings};
pub use sqlx::PgPool;
pub use repos::*;
