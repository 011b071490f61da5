//! Extractors whose failures render the shared error page.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::debug;

use crate::error::AppError;

/// Numeric id from the last path segment, e.g. `/edit_post/{id}`.
/// Anything that is not an `i64` is treated as an unknown page.
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                debug!(path = %parts.uri.path(), "Bad id in path: {}", rejection.body_text());
                Err(AppError::NotFound("Page"))
            }
        }
    }
}
