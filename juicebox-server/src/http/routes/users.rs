//! User endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::{User, UserRepo, UserUpdate, UserWithPosts};
use crate::http::error::ApiError;
use crate::http::extractors::{PathId, RequireRequester, ValidJson};
use crate::http::server::AppState;

/// User list response
#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// Single user response
#[derive(Serialize)]
pub struct UserResponse<T> {
    pub user: T,
}

/// GET /api/users - every user, credentials stripped
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<UsersResponse>, ApiError> {
    let users = UserRepo::new(&state.pool).list_users().await?;
    Ok(Json(UsersResponse { users }))
}

/// GET /api/users/{user_id} - a user and their posts
async fn get_user(
    State(state): State<Arc<AppState>>,
    PathId(user_id): PathId,
) -> Result<Json<UserResponse<UserWithPosts>>, ApiError> {
    // The repository reports absence as None; this is where it becomes a 404
    let user = UserRepo::new(&state.pool)
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(Json(UserResponse { user }))
}

/// PATCH /api/users/{user_id} - update the requester's own profile
async fn update_user(
    State(state): State<Arc<AppState>>,
    PathId(user_id): PathId,
    RequireRequester(requester): RequireRequester,
    ValidJson(fields): ValidJson<UserUpdate>,
) -> Result<Json<UserResponse<User>>, ApiError> {
    if requester.id != user_id {
        return Err(ApiError::forbidden("You cannot update another user"));
    }

    if fields.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    let user = UserRepo::new(&state.pool)
        .update_user(user_id, fields)
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    tracing::info!(user_id, "user updated");
    Ok(Json(UserResponse { user }))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{user_id}", get(get_user).patch(update_user))
}
