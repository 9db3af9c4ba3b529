use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::notify::{DispatchFailure, NotificationDispatcher};
use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::entities::{Post, PostDraft};
use crate::domain::types::{PostAction, PostId};

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("post {id} was updated but notification failed: {failure}")]
    NotificationFailed {
        id: PostId,
        #[source]
        failure: DispatchFailure,
    },
}

/// Post use cases on top of a store and the notification fan-out.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostsRepo>,
    notifications: NotificationDispatcher,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostsRepo>, notifications: NotificationDispatcher) -> Self {
        Self {
            repo,
            notifications,
        }
    }

    pub async fn create(&self, draft: PostDraft) -> Result<Post, PostServiceError> {
        let post = self.repo.create_post(draft).await?;
        counter!("postboard_posts_created_total").increment(1);
        info!(target = "postboard::posts", post_id = %post.id, "post created");

        self.notify_best_effort(&post, PostAction::Create).await;
        Ok(post)
    }

    pub async fn get(&self, id: PostId) -> Result<Post, PostServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(PostServiceError::Repo(RepoError::NotFound))
    }

    pub async fn list(&self) -> Result<Vec<Post>, PostServiceError> {
        Ok(self.repo.list_posts().await?)
    }

    /// Replace title and body of `id`. Notification failures are logged only.
    pub async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, PostServiceError> {
        let post = self.store_update(id, draft).await?;
        self.notify_best_effort(&post, PostAction::Update).await;
        Ok(post)
    }

    /// Replace title and body of `id`, then require every notifier to succeed.
    ///
    /// The update stays persisted when notification fails; the error carries every failing
    /// channel.
    pub async fn update_and_notify(
        &self,
        id: PostId,
        draft: PostDraft,
    ) -> Result<Post, PostServiceError> {
        let post = self.store_update(id, draft).await?;
        match self
            .notifications
            .dispatch(&post, PostAction::Update)
            .await
            .into_result()
        {
            Ok(_) => Ok(post),
            Err(failure) => Err(PostServiceError::NotificationFailed { id, failure }),
        }
    }

    pub async fn delete(&self, id: PostId) -> Result<(), PostServiceError> {
        let post = self.get(id).await?;
        self.repo.delete_post(id).await?;
        counter!("postboard_posts_deleted_total").increment(1);
        info!(target = "postboard::posts", post_id = %id, "post deleted");

        self.notify_best_effort(&post, PostAction::Delete).await;
        Ok(())
    }

    async fn store_update(&self, id: PostId, draft: PostDraft) -> Result<Post, PostServiceError> {
        let post = self.repo.update_post(draft.into_post(id)).await?;
        counter!("postboard_posts_updated_total").increment(1);
        info!(target = "postboard::posts", post_id = %id, "post updated");
        Ok(post)
    }

    async fn notify_best_effort(&self, post: &Post, action: PostAction) {
        if self.notifications.is_empty() {
            return;
        }
        let report = self.notifications.dispatch(post, action).await;
        if !report.is_success() {
            warn!(
                target = "postboard::posts",
                post_id = %post.id,
                action = action.as_str(),
                failed = report.failures.len(),
                delivered = report.delivered.len(),
                "post change notification incomplete"
            );
        }
    }
}
