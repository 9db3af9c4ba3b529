//! Posts handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::{decode_payload, post_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::PostIdParam;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_posts(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list().await.map_err(post_to_api)?;
    let items: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(Json(items))
}

pub async fn get_post(
    State(state): State<ApiState>,
    PostIdParam(id): PostIdParam,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.get(id).await.map_err(post_to_api)?;
    Ok(Json(PostResponse::from(post)))
}

pub async fn create_post(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = decode_payload(&body)?;

    let post = state
        .posts
        .create(payload.into_draft())
        .await
        .map_err(post_to_api)?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

pub async fn update_post(
    State(state): State<ApiState>,
    PostIdParam(id): PostIdParam,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // Unknown ids answer 404 even when the body is malformed.
    state.posts.get(id).await.map_err(post_to_api)?;
    let payload = decode_payload(&body)?;

    let post = state
        .posts
        .update(id, payload.into_draft())
        .await
        .map_err(post_to_api)?;

    Ok(Json(PostResponse::from(post)))
}

/// Update a post and require every notifier to accept the change.
pub async fn replace_post(
    State(state): State<ApiState>,
    PostIdParam(id): PostIdParam,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.get(id).await.map_err(post_to_api)?;
    let payload = decode_payload(&body)?;

    state
        .posts
        .update_and_notify(id, payload.into_draft())
        .await
        .map_err(post_to_api)?;

    Ok(Json(StatusResponse::new("post updated")))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    PostIdParam(id): PostIdParam,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete(id).await.map_err(post_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn missing_post_id() -> ApiError {
    ApiError::invalid_id("post id is missing")
}
