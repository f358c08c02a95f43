//! Repository implementations for database access
//!
//! Each repository borrows the pool it is given:
//! - Handles uniqueness via ON CONFLICT (no check-then-insert)
//! - Enriches posts one id at a time, fanned out with `try_join_all`
//! - Uses a transaction for the tag-set replacement in `update_post`

pub mod posts;
pub mod tags;
pub mod users;

pub use posts::{Author, NewPost, Post, PostRepo, PostUpdate};
pub use tags::{Tag, TagRepo};
pub use users::{NewUser, User, UserRecord, UserRepo, UserUpdate, UserWithPosts};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Could not find a post with that postId")]
    PostNotFound { post_id: i32 },
}

impl DbError {
    /// Stable error name surfaced to API clients alongside the message.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sqlx(_) => "DatabaseError",
            Self::PostNotFound { .. } => "PostNotFoundError",
        }
    }
}
