//! Tag endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::posts::PostsResponse;
use crate::db::{Tag, TagRepo};
use crate::http::error::ApiError;
use crate::http::extractors::MaybeRequester;
use crate::http::server::AppState;
use crate::visibility::visible_posts;

/// Tag list response
#[derive(Serialize)]
pub struct TagsResponse {
    pub tags: Vec<Tag>,
}

/// GET /api/tags - list all tags
async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<TagsResponse>, ApiError> {
    let tags = TagRepo::new(&state.pool).get_all_tags().await?;
    Ok(Json(TagsResponse { tags }))
}

/// GET /api/tags/{tag_name}/posts - posts carrying a tag, filtered for the requester
async fn list_posts_for_tag(
    State(state): State<Arc<AppState>>,
    tag_name: Result<Path<String>, PathRejection>,
    MaybeRequester(requester): MaybeRequester,
) -> Result<Json<PostsResponse>, ApiError> {
    let Path(tag_name) = tag_name?;
    let posts = TagRepo::new(&state.pool)
        .get_posts_by_tag_name(&tag_name)
        .await?;
    let posts = visible_posts(posts, requester.map(|r| r.id));

    Ok(Json(PostsResponse { posts }))
}

/// Tag routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tags", get(list_tags))
        .route("/api/tags/{tag_name}/posts", get(list_posts_for_tag))
}
