//! Custom Axum extractors
//!
//! Authentication happens upstream. A fronting proxy that has verified the
//! caller forwards their username in a trusted header (name configured in
//! [`ServerConfig::requester_header`](super::ServerConfig)); these extractors
//! turn it into a [`Requester`].
//!
//! [`PathId`] and [`ValidJson`] stand in for axum's `Path` and `Json` so
//! their rejections come back as `ValidationError` JSON.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::server::AppState;
use crate::db::UserRepo;

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: i32,
    pub username: String,
}

/// Requester if the identity header is present, `None` for anonymous requests.
///
/// A header naming an unknown or inactive user is rejected rather than
/// downgraded to anonymous.
pub struct MaybeRequester(pub Option<Requester>);

impl FromRequestParts<Arc<AppState>> for MaybeRequester {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(state.config.requester_header.as_str()) else {
            return Ok(Self(None));
        };

        let username = value
            .to_str()
            .map(str::trim)
            .map_err(|_| ApiError::unauthorized("Malformed requester header"))?;

        if username.is_empty() {
            return Err(ApiError::unauthorized("Malformed requester header"));
        }

        let record = UserRepo::new(&state.pool)
            .get_user_by_username(username)
            .await?;

        match record {
            Some(user) if user.active => Ok(Self(Some(Requester {
                id: user.id,
                username: user.username,
            }))),
            Some(_) => {
                tracing::debug!(username, "requester is deactivated");
                Err(ApiError::unauthorized("This user has been deactivated"))
            }
            None => {
                tracing::debug!(username, "requester not found");
                Err(ApiError::unauthorized("Unknown requester"))
            }
        }
    }
}

/// Requester that must be present; anonymous requests get 401.
pub struct RequireRequester(pub Requester);

impl FromRequestParts<Arc<AppState>> for RequireRequester {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeRequester(requester) = MaybeRequester::from_request_parts(parts, state).await?;

        requester
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized("You must be logged in to perform this action"))
    }
}

/// Single integer id from the route path (`{post_id}`, `{user_id}`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i32);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state).await?;

        raw.parse()
            .map(Self)
            .map_err(|_| ApiError::validation(format!("`{raw}` is not a valid id")))
    }
}

/// JSON request body; malformed or mistyped bodies are a 400 `ValidationError`.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
