//! Post repository
//!
//! A [`Post`] handed out here is always enriched: its tag list and a trimmed
//! [`Author`] are joined in and the raw `author_id` is dropped.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::{DbError, Tag, TagRepo};

/// Posts row as stored
#[derive(Debug, Clone, FromRow)]
struct PostRow {
    id: i32,
    author_id: i32,
    title: String,
    content: String,
    active: bool,
}

/// Public view of a post's author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub location: String,
}

/// Post with tags and author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub active: bool,
    pub tags: Vec<Tag>,
    pub author: Author,
}

/// Fields for a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i32,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Partial post update. Tags are handled separately by `update_post`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub active: Option<bool>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.active.is_none()
    }

    fn statement(&self, post_id: i32) -> Option<QueryBuilder<'static, Postgres>> {
        if self.is_empty() {
            return None;
        }

        let mut builder = QueryBuilder::new("UPDATE posts SET ");
        {
            let mut set = builder.separated(", ");
            if let Some(title) = &self.title {
                set.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(content) = &self.content {
                set.push("content = ").push_bind_unseparated(content.clone());
            }
            if let Some(active) = self.active {
                set.push("active = ").push_bind_unseparated(active);
            }
        }
        builder.push(" WHERE id = ").push_bind(post_id);

        Some(builder)
    }
}

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the post, create its tags, and associate them.
    ///
    /// These are separate round trips; a failure part way leaves the
    /// earlier steps in place.
    #[tracing::instrument(skip(self, new_post), fields(author_id = new_post.author_id))]
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post, DbError> {
        let post_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (author_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(new_post.author_id)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(post_id, "post inserted");

        let tag_repo = TagRepo::new(self.pool);
        let tags = tag_repo.create_tags(&new_post.tags).await?;
        tag_repo.add_tags_to_post(post_id, &tags).await
    }

    /// Fetch one enriched post. A missing id is [`DbError::PostNotFound`].
    pub async fn get_post_by_id(&self, post_id: i32) -> Result<Post, DbError> {
        let row: PostRow = sqlx::query_as(
            r#"
            SELECT id, author_id, title, content, active
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(DbError::PostNotFound { post_id })?;

        let tags: Vec<Tag> = sqlx::query_as(
            r#"
            SELECT tags.id, tags.name
            FROM tags
            JOIN post_tags ON tags.id = post_tags.tag_id
            WHERE post_tags.post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        let author: Author = sqlx::query_as(
            r#"
            SELECT id, username, name, location
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(row.author_id)
        .fetch_one(self.pool)
        .await?;

        Ok(Post {
            id: row.id,
            title: row.title,
            content: row.content,
            active: row.active,
            tags,
            author,
        })
    }

    /// Every post, enriched.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_posts(&self) -> Result<Vec<Post>, DbError> {
        let post_ids: Vec<i32> = sqlx::query_scalar("SELECT id FROM posts")
            .fetch_all(self.pool)
            .await?;

        self.get_posts_by_ids(post_ids).await
    }

    /// Every post by one author, enriched.
    #[tracing::instrument(skip(self))]
    pub async fn get_posts_by_user(&self, user_id: i32) -> Result<Vec<Post>, DbError> {
        let post_ids: Vec<i32> = sqlx::query_scalar("SELECT id FROM posts WHERE author_id = $1")
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        self.get_posts_by_ids(post_ids).await
    }

    /// Enrich each id concurrently. Any failure fails the whole batch.
    pub(crate) async fn get_posts_by_ids(&self, post_ids: Vec<i32>) -> Result<Vec<Post>, DbError> {
        try_join_all(post_ids.into_iter().map(|id| self.get_post_by_id(id))).await
    }

    /// Apply field changes and, when `tags` is `Some`, replace the post's tag set.
    ///
    /// `tags: None` leaves associations alone. `Some(vec![])` clears them.
    #[tracing::instrument(skip(self, fields, tags))]
    pub async fn update_post(
        &self,
        post_id: i32,
        fields: PostUpdate,
        tags: Option<Vec<String>>,
    ) -> Result<Post, DbError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(self.pool)
            .await?;

        if !exists.0 {
            return Err(DbError::PostNotFound { post_id });
        }

        self.update_existing_post(post_id, fields, tags).await
    }

    /// `update_post` for callers that have just loaded the post themselves
    /// (the PATCH handler does, to check authorship), skipping the existence
    /// query.
    pub(crate) async fn update_existing_post(
        &self,
        post_id: i32,
        fields: PostUpdate,
        tags: Option<Vec<String>>,
    ) -> Result<Post, DbError> {
        if let Some(mut builder) = fields.statement(post_id) {
            builder.build().execute(self.pool).await?;
        }

        let Some(names) = tags else {
            return self.get_post_by_id(post_id).await;
        };

        let resolved = TagRepo::new(self.pool).create_tags(&names).await?;
        let keep: Vec<i32> = resolved.iter().map(|tag| tag.id).collect();

        // Removal and re-association land together
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM post_tags
            WHERE post_id = $1
            AND NOT (tag_id = ANY($2))
            "#,
        )
        .bind(post_id)
        .bind(&keep[..])
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for tag_id in &keep {
            sqlx::query(
                r#"
                INSERT INTO post_tags (post_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT (post_id, tag_id) DO NOTHING
                "#,
            )
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(removed, kept = keep.len(), "post tags synchronized");

        self.get_post_by_id(post_id).await
    }
}
