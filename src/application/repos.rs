//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{Post, PostDraft};
use crate::domain::types::PostId;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Assign the next id to `draft` and store it.
    async fn create_post(&self, draft: PostDraft) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError>;

    /// All stored posts, ascending by id.
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError>;

    /// Replace title and body of an existing post. Missing ids yield `NotFound`
    /// and leave the store untouched.
    async fn update_post(&self, post: Post) -> Result<Post, RepoError>;

    async fn delete_post(&self, id: PostId) -> Result<(), RepoError>;
}
