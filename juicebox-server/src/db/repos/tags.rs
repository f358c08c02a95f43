//! Tag repository
//!
//! Tags are created lazily by name and shared across posts:
//! - create: INSERT ... ON CONFLICT (name) DO NOTHING, then re-select
//! - associate: INSERT ... ON CONFLICT (post_id, tag_id) DO NOTHING

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use super::{DbError, Post, PostRepo};

/// Tag record from database
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// Tag repository
pub struct TagRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create any missing tags and return the rows for every requested name,
    /// whether new or pre-existing. An empty list touches nothing.
    pub async fn create_tags(&self, names: &[String]) -> Result<Vec<Tag>, DbError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query(
            r#"
            INSERT INTO tags (name)
            SELECT DISTINCT name FROM UNNEST($1::varchar[]) AS requested(name)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(names)
        .execute(self.pool)
        .await?;

        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(self.pool)
            .await?;

        Ok(tags)
    }

    /// Associate one tag with one post. Re-adding an existing pair is a no-op.
    pub async fn create_post_tag(&self, post_id: i32, tag_id: i32) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO post_tags (post_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, tag_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Associate every tag with the post, then return the enriched post.
    ///
    /// Inserts run concurrently; the first failure fails the call, and rows
    /// already written by the others stay written.
    #[tracing::instrument(skip(self, tags), fields(tag_count = tags.len()))]
    pub async fn add_tags_to_post(&self, post_id: i32, tags: &[Tag]) -> Result<Post, DbError> {
        try_join_all(tags.iter().map(|tag| self.create_post_tag(post_id, tag.id))).await?;

        PostRepo::new(self.pool).get_post_by_id(post_id).await
    }

    /// List every tag.
    pub async fn get_all_tags(&self) -> Result<Vec<Tag>, DbError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags")
            .fetch_all(self.pool)
            .await?;

        Ok(tags)
    }

    /// Every post carrying the tag with exactly this name, enriched.
    /// Unknown or unused tags give an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn get_posts_by_tag_name(&self, name: &str) -> Result<Vec<Post>, DbError> {
        let post_ids: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT posts.id
            FROM posts
            JOIN post_tags ON posts.id = post_tags.post_id
            JOIN tags ON tags.id = post_tags.tag_id
            WHERE tags.name = $1
            "#,
        )
        .bind(name)
        .fetch_all(self.pool)
        .await?;

        PostRepo::new(self.pool).get_posts_by_ids(post_ids).await
    }
}
