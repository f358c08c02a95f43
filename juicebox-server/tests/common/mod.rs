//! Shared helpers for database-backed tests
//!
//! Each call to [`test_pool`] creates a fresh schema and pins every pooled
//! connection's `search_path` to it, so tests can run side by side against
//! one database. Tests end with [`teardown`], which drops that schema. A test
//! that panics first leaves its schema behind; clear leftovers with
//! `DROP SCHEMA juicebox_test_<id> CASCADE` (list them via
//! `SELECT nspname FROM pg_namespace WHERE nspname LIKE 'juicebox_test_%'`).

#![allow(dead_code)]

use juicebox_server::db::{schema, NewUser, PoolSettings, User, UserRepo};
use sqlx::{Executor, PgPool};
use uuid::Uuid;

pub const SCHEMA_PREFIX: &str = "juicebox_test_";

pub async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let schema_name = format!("{SCHEMA_PREFIX}{}", Uuid::new_v4().simple());

    let admin = PgPool::connect(&url).await.expect("connect failed");
    admin
        .execute(format!("CREATE SCHEMA {schema_name}").as_str())
        .await
        .expect("create schema failed");
    admin.close().await;

    let search_path = format!("SET search_path TO {schema_name}");
    let pool = PoolSettings::default()
        .options()
        .after_connect(move |conn, _meta| {
            let search_path = search_path.clone();
            Box::pin(async move {
                conn.execute(search_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .expect("pool creation failed");

    schema::create_tables(&pool).await.expect("create tables failed");
    pool
}

/// Name of the schema `pool` is pinned to.
pub async fn schema_name(pool: &PgPool) -> String {
    sqlx::query_scalar("SELECT current_schema()")
        .fetch_one(pool)
        .await
        .expect("current_schema failed")
}

/// Drop the pool's test schema and close the pool.
pub async fn teardown(pool: PgPool) {
    let schema_name = schema_name(&pool).await;
    assert!(
        schema_name.starts_with(SCHEMA_PREFIX),
        "refusing to drop non-test schema {schema_name}"
    );

    pool.execute(format!("DROP SCHEMA {schema_name} CASCADE").as_str())
        .await
        .expect("drop schema failed");
    pool.close().await;
}

pub async fn create_user(pool: &PgPool, username: &str) -> User {
    UserRepo::new(pool)
        .create_user(NewUser {
            username: username.to_owned(),
            password: format!("{username}-secret"),
            name: format!("{username} name"),
            location: "Nowhere".to_owned(),
        })
        .await
        .expect("create user failed")
        .expect("username already taken")
}
