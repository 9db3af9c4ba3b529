//! Custom extractors for the post API.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::domain::types::PostId;

use super::error::ApiError;

/// Post id taken from the `{id}` path segment. Non-numeric ids are rejected with 400.
#[derive(Debug, Clone, Copy)]
pub struct PostIdParam(pub PostId);

impl<S> FromRequestParts<S> for PostIdParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::invalid_id(rejection.body_text()))?;

        raw.parse::<PostId>()
            .map(Self)
            .map_err(|err| ApiError::invalid_id(err.to_string()))
    }
}
