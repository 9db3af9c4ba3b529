//! Domain entities held by the post store.

use serde::Serialize;

use crate::domain::types::PostId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
}

/// Title and body of a post that has not been assigned an id yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            title: self.title,
            body: self.body,
        }
    }
}
