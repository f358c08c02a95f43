//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Requester resolution from a trusted identity header
//! - JSON `{ name, message }` error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use extractors::{MaybeRequester, PathId, Requester, RequireRequester, ValidJson};
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
