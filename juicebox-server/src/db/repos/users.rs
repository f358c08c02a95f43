//! User repository
//!
//! Every read that hands out a [`User`] selects an explicit column list
//! without `password`. Only [`UserRepo::get_user_by_username`] returns the
//! raw [`UserRecord`], for callers that need to check credentials.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::{DbError, Post, PostRepo};

const USER_COLUMNS: &str = "id, username, name, location, active";

/// User without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

/// Raw users row, credential included
#[derive(Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("active", &self.active)
            .finish()
    }
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            name: r.name,
            location: r.location,
            active: r.active,
        }
    }
}

/// User together with every post they wrote
#[derive(Debug, Clone, Serialize)]
pub struct UserWithPosts {
    #[serde(flatten)]
    pub user: User,
    pub posts: Vec<Post>,
}

/// Fields for a new user
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub location: String,
}

/// Partial user update. Each `Some` field becomes one `SET` assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub active: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.name.is_none()
            && self.location.is_none()
            && self.active.is_none()
    }

    /// Build the `UPDATE users` statement, or `None` when nothing is set.
    fn statement(&self, id: i32) -> Option<QueryBuilder<'static, Postgres>> {
        if self.is_empty() {
            return None;
        }

        let mut builder = QueryBuilder::new("UPDATE users SET ");
        {
            let mut set = builder.separated(", ");
            if let Some(username) = &self.username {
                set.push("username = ").push_bind_unseparated(username.clone());
            }
            if let Some(name) = &self.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(location) = &self.location {
                set.push("location = ").push_bind_unseparated(location.clone());
            }
            if let Some(active) = self.active {
                set.push("active = ").push_bind_unseparated(active);
            }
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ").push(USER_COLUMNS);

        Some(builder)
    }
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every user, credentials stripped.
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users"))
            .fetch_all(self.pool)
            .await?;

        Ok(users)
    }

    /// Insert a user. Returns `None` when the username is already taken.
    pub async fn create_user(&self, new_user: NewUser) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password, name, location)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(&new_user.name)
        .bind(&new_user.location)
        .fetch_optional(self.pool)
        .await?;

        if user.is_none() {
            tracing::debug!(username = %new_user.username, "username already exists");
        }
        Ok(user)
    }

    /// Apply the supplied fields. An empty update returns `None` without
    /// touching the database; so does an id with no row.
    pub async fn update_user(&self, id: i32, fields: UserUpdate) -> Result<Option<User>, DbError> {
        let Some(mut builder) = fields.statement(id) else {
            return Ok(None);
        };

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Fetch a user with all of their posts. Absence is `None`, not an error.
    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<UserWithPosts>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        let posts = PostRepo::new(self.pool).get_posts_by_user(id).await?;
        Ok(Some(UserWithPosts { user, posts }))
    }

    /// Fetch the raw row for a username, credential included.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DbError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, password, name, location, active
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }
}
