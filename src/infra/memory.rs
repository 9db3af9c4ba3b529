//! In-process post store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::entities::{Post, PostDraft};
use crate::domain::types::PostId;

#[derive(Debug, Default)]
struct PostTable {
    last_id: i64,
    posts: BTreeMap<PostId, Post>,
}

/// Post store keeping everything in memory behind a single lock.
///
/// Every operation, reads included, goes through the same `RwLock`, so id assignment and map
/// access can never interleave.
#[derive(Debug, Default)]
pub struct InMemoryPostsRepo {
    table: RwLock<PostTable>,
}

impl InMemoryPostsRepo {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.table.read().await.posts.len()
    }
}

#[async_trait]
impl PostsRepo for InMemoryPostsRepo {
    async fn create_post(&self, draft: PostDraft) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let next = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepoError::Persistence("post id space exhausted".to_string()))?;
        table.last_id = next;

        let post = draft.into_post(PostId::new(next));
        table.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.table.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.table.read().await.posts.values().cloned().collect())
    }

    async fn update_post(&self, post: Post) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let stored = table.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *stored = post.clone();
        Ok(post)
    }

    async fn delete_post(&self, id: PostId) -> Result<(), RepoError> {
        let mut table = self.table.write().await;
        table
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
