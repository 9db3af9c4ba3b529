use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::application::error::ErrorReport;
use crate::application::posts::PostServiceError;
use crate::application::repos::RepoError;

use super::error::{ApiError, codes};
use super::models::PostPayload;

mod posts;

pub use posts::*;

/// Decode a JSON body regardless of the declared content type.
fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::invalid_json(err.to_string()))
}

/// Decode a post body. A JSON `null` yields an empty payload.
fn decode_payload(body: &[u8]) -> Result<PostPayload, ApiError> {
    Ok(decode_json::<Option<PostPayload>>(body)?.unwrap_or_default())
}

fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("post not found"),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

fn post_to_api(err: PostServiceError) -> ApiError {
    match err {
        PostServiceError::Repo(repo) => repo_to_api(repo),
        PostServiceError::NotificationFailed { ref failure, .. } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::NOTIFICATION_FAILED,
            "Post updated but notification failed",
            Some(failure.to_string()),
        )
        .with_report(ErrorReport::from_error(
            "application::posts",
            StatusCode::INTERNAL_SERVER_ERROR,
            &err,
        )),
    }
}
