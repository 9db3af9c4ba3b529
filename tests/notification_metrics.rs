use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;

use postboard::application::notify::{NotificationDispatcher, NotifyError, PostNotifier};
use postboard::application::posts::PostService;
use postboard::domain::entities::{Post, PostDraft};
use postboard::domain::types::PostAction;
use postboard::infra::memory::InMemoryPostsRepo;

struct Outcome {
    channel: &'static str,
    fail: bool,
}

#[async_trait]
impl PostNotifier for Outcome {
    fn channel(&self) -> &'static str {
        self.channel
    }

    async fn notify_post_changed(
        &self,
        _post: &Post,
        _action: PostAction,
    ) -> Result<(), NotifyError> {
        if self.fail {
            Err(NotifyError::transport("unreachable"))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn post_lifecycle_emits_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let notifiers: Vec<Arc<dyn PostNotifier>> = vec![
        Arc::new(Outcome {
            channel: "email",
            fail: false,
        }),
        Arc::new(Outcome {
            channel: "line",
            fail: true,
        }),
    ];
    let posts = PostService::new(
        Arc::new(InMemoryPostsRepo::new()),
        NotificationDispatcher::new(notifiers),
    );

    let post = posts
        .create(PostDraft::new("metrics", "body"))
        .await
        .expect("create");
    posts
        .update(post.id, PostDraft::new("metrics", "changed"))
        .await
        .expect("update");
    let _ = posts
        .update_and_notify(post.id, PostDraft::new("metrics", "again"))
        .await;
    posts.delete(post.id).await.expect("delete");

    let entries = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = entries
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "postboard_posts_created_total",
        "postboard_posts_updated_total",
        "postboard_posts_deleted_total",
        "postboard_notifications_delivered_total",
        "postboard_notifications_failed_total",
    ];
    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let failed_channels: HashSet<String> = entries
        .iter()
        .filter(|(composite_key, _, _, _)| {
            composite_key.key().name() == "postboard_notifications_failed_total"
        })
        .flat_map(|(composite_key, _, _, _)| {
            composite_key
                .key()
                .labels()
                .map(|label| label.value().to_string())
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(failed_channels, HashSet::from(["line".to_string()]));
}
