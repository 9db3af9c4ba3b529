use serde::{Deserialize, Serialize};

use crate::domain::entities::{Post, PostDraft};

/// Body of `POST /posts`, `PATCH /posts/{id}` and `PUT /posts/{id}`.
/// Absent fields decode as empty strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PostPayload {
    pub title: String,
    pub body: String,
}

impl PostPayload {
    pub fn into_draft(self) -> PostDraft {
        PostDraft::new(self.title, self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.get(),
            title: post.title,
            body: post.body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}
