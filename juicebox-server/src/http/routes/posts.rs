//! Post endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, NewPost, Post, PostRepo, PostUpdate};
use crate::http::error::ApiError;
use crate::http::extractors::{MaybeRequester, PathId, RequireRequester, ValidJson};
use crate::http::server::AppState;
use crate::visibility::visible_posts;

/// Tags as sent by clients: either `"#a #b"` or `["#a", "#b"]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    Text(String),
    List(Vec<String>),
}

impl TagInput {
    /// Split and trim into tag names, dropping blanks.
    pub fn into_names(self) -> Vec<String> {
        match self {
            Self::Text(text) => text.split_whitespace().map(str::to_owned).collect(),
            Self::List(list) => list
                .into_iter()
                .map(|name| name.trim().to_owned())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }
}

/// Create post request
#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub tags: Option<TagInput>,
}

/// Update post request. An absent `tags` leaves the tag set untouched.
#[derive(Deserialize)]
pub struct UpdatePostRequest {
    #[serde(flatten)]
    pub fields: PostUpdate,
    pub tags: Option<TagInput>,
}

/// Post list response
#[derive(Serialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

/// Single post response
#[derive(Serialize)]
pub struct PostResponse {
    pub post: Post,
}

/// GET /api/posts - every post, filtered for the requester
async fn list_posts(
    State(state): State<Arc<AppState>>,
    MaybeRequester(requester): MaybeRequester,
) -> Result<Json<PostsResponse>, ApiError> {
    let posts = PostRepo::new(&state.pool).get_all_posts().await?;
    let posts = visible_posts(posts, requester.map(|r| r.id));

    Ok(Json(PostsResponse { posts }))
}

/// POST /api/posts - create a post authored by the requester
async fn create_post(
    State(state): State<Arc<AppState>>,
    RequireRequester(requester): RequireRequester,
    ValidJson(req): ValidJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let post = PostRepo::new(&state.pool)
        .create_post(NewPost {
            author_id: requester.id,
            title: req.title,
            content: req.content,
            tags: req.tags.map(TagInput::into_names).unwrap_or_default(),
        })
        .await?;

    tracing::info!(post_id = post.id, author = %requester.username, "post created");
    Ok((StatusCode::CREATED, Json(PostResponse { post })))
}

/// GET /api/posts/{post_id} - a single post; inactive posts only for their author
async fn get_post(
    State(state): State<Arc<AppState>>,
    PathId(post_id): PathId,
    MaybeRequester(requester): MaybeRequester,
) -> Result<Json<PostResponse>, ApiError> {
    let post = PostRepo::new(&state.pool).get_post_by_id(post_id).await?;

    let is_author = requester.is_some_and(|r| r.id == post.author.id);
    if !post.active && !is_author {
        return Err(DbError::PostNotFound { post_id }.into());
    }

    Ok(Json(PostResponse { post }))
}

/// PATCH /api/posts/{post_id} - update fields and/or tags of the requester's own post
async fn update_post(
    State(state): State<Arc<AppState>>,
    PathId(post_id): PathId,
    RequireRequester(requester): RequireRequester,
    ValidJson(req): ValidJson<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let repo = PostRepo::new(&state.pool);
    let existing = repo.get_post_by_id(post_id).await?;

    if existing.author.id != requester.id {
        return Err(ApiError::forbidden(
            "You cannot update a post that is not yours",
        ));
    }

    // Existence was established by the load above
    let post = repo
        .update_existing_post(post_id, req.fields, req.tags.map(TagInput::into_names))
        .await?;

    Ok(Json(PostResponse { post }))
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{post_id}", get(get_post).patch(update_post))
}
