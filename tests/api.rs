use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use postboard::application::notify::{NotificationDispatcher, NotifyError, PostNotifier};
use postboard::application::posts::PostService;
use postboard::application::repos::{PostsRepo, RepoError};
use postboard::domain::entities::{Post, PostDraft};
use postboard::domain::types::{PostAction, PostId};
use postboard::infra::http::{ApiState, build_router};
use postboard::infra::memory::InMemoryPostsRepo;

struct ScriptedNotifier {
    channel: &'static str,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedNotifier {
    fn new(channel: &'static str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            channel,
            fail,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostNotifier for ScriptedNotifier {
    fn channel(&self) -> &'static str {
        self.channel
    }

    async fn notify_post_changed(
        &self,
        _post: &Post,
        _action: PostAction,
    ) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(NotifyError::Rejected {
                status: 503,
                detail: "unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

struct BrokenRepo;

#[async_trait]
impl PostsRepo for BrokenRepo {
    async fn create_post(&self, _draft: PostDraft) -> Result<Post, RepoError> {
        Err(RepoError::from_persistence("disk full"))
    }

    async fn find_by_id(&self, _id: PostId) -> Result<Option<Post>, RepoError> {
        Err(RepoError::from_persistence("disk full"))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        Err(RepoError::from_persistence("disk full"))
    }

    async fn update_post(&self, _post: Post) -> Result<Post, RepoError> {
        Err(RepoError::from_persistence("disk full"))
    }

    async fn delete_post(&self, _id: PostId) -> Result<(), RepoError> {
        Err(RepoError::from_persistence("disk full"))
    }
}

fn router_with(repo: Arc<dyn PostsRepo>, notifiers: Vec<Arc<dyn PostNotifier>>) -> Router {
    let posts = PostService::new(repo, NotificationDispatcher::new(notifiers));
    build_router(ApiState::new(posts))
}

fn router(notifiers: Vec<Arc<dyn PostNotifier>>) -> Router {
    router_with(Arc::new(InMemoryPostsRepo::new()), notifiers)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request");

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn create(router: &Router, title: &str, body: &str) -> Value {
    let payload = json!({ "title": title, "body": body }).to_string();
    let (status, value) = send(router, Method::POST, "/posts", Some(&payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    value
}

#[tokio::test]
async fn create_assigns_increasing_ids() {
    let app = router(Vec::new());

    let first = create(&app, "Hello", "World").await;
    let second = create(&app, "Again", "Text").await;

    assert_eq!(first, json!({ "id": 1, "title": "Hello", "body": "World" }));
    assert_eq!(second["id"], 2);
}

#[tokio::test]
async fn create_without_content_type_still_decodes_json() {
    let app = router(Vec::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/posts")
        .header("content-type", "text/plain")
        .body(Body::from(r#"{"title":"plain"}"#))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["title"], "plain");
    assert_eq!(value["body"], "");
}

#[tokio::test]
async fn null_body_creates_empty_post() {
    let app = router(Vec::new());

    let (status, body) = send(&app, Method::POST, "/posts", Some("null")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": 1, "title": "", "body": "" }));

    let (status, _) = send(&app, Method::POST, "/posts", Some("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_returns_posts_in_id_order() {
    let app = router(Vec::new());
    let (status, empty) = send(&app, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty, json!([]));

    for title in ["a", "b", "c"] {
        create(&app, title, "x").await;
    }
    let (status, _) = send(
        &app,
        Method::PATCH,
        "/posts/1",
        Some(r#"{"title":"a2","body":"y"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, list) = send(&app, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = list
        .as_array()
        .expect("array")
        .iter()
        .map(|p| p["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(list[0]["title"], "a2");
}

#[tokio::test]
async fn get_unknown_post_is_404() {
    let app = router(Vec::new());
    let (status, body) = send(&app, Method::GET, "/posts/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn invalid_ids_are_400() {
    let app = router(Vec::new());

    let (status, body) = send(&app, Method::GET, "/posts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_id");

    let (status, body) = send(&app, Method::DELETE, "/posts/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_id");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = router(Vec::new());
    let (status, body) = send(&app, Method::POST, "/posts", Some("{\"title\":")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_json");

    create(&app, "keep", "me").await;
    let (status, _) = send(&app, Method::PATCH, "/posts/1", Some("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = send(&app, Method::GET, "/posts/1", None).await;
    assert_eq!(stored["title"], "keep");
}

#[tokio::test]
async fn patch_unknown_post_is_404_without_side_effects() {
    let notifier = ScriptedNotifier::new("email", false);
    let app = router(vec![notifier.clone()]);
    create(&app, "only", "one").await;

    let (status, body) = send(&app, Method::PATCH, "/posts/9", Some("{broken")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (_, list) = send(&app, Method::GET, "/posts", None).await;
    assert_eq!(list, json!([{ "id": 1, "title": "only", "body": "one" }]));
    assert_eq!(notifier.calls(), 1);
}

#[tokio::test]
async fn patch_succeeds_even_when_notifiers_fail() {
    let failing = ScriptedNotifier::new("line", true);
    let app = router(vec![failing.clone()]);
    create(&app, "t", "b").await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/posts/1",
        Some(r#"{"title":"t2","body":"b2"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "title": "t2", "body": "b2" }));
    assert_eq!(failing.calls(), 2);
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let app = router(Vec::new());
    create(&app, "gone", "soon").await;

    let (status, body) = send(&app, Method::DELETE, "/posts/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, "/posts/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/posts/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_reports_post_updated_when_all_notifiers_succeed() {
    let email = ScriptedNotifier::new("email", false);
    let line = ScriptedNotifier::new("line", false);
    let app = router(vec![email.clone(), line.clone()]);
    create(&app, "old", "text").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/posts/1",
        Some(r#"{"title":"new","body":"text"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "post updated" }));
    assert_eq!(email.calls(), 2);
    assert_eq!(line.calls(), 2);
}

#[tokio::test]
async fn put_with_failing_notifier_is_500_but_update_persists() {
    let email = ScriptedNotifier::new("email", true);
    let line = ScriptedNotifier::new("line", false);
    let app = router(vec![email.clone(), line.clone()]);
    create(&app, "old", "text").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/posts/1",
        Some(r#"{"title":"new","body":"body"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "notification_failed");
    assert!(
        body["error"]["hint"]
            .as_str()
            .expect("hint")
            .contains("email")
    );
    assert_eq!(line.calls(), 2);

    let (_, stored) = send(&app, Method::GET, "/posts/1", None).await;
    assert_eq!(stored["title"], "new");
}

#[tokio::test]
async fn put_unknown_post_is_404() {
    let email = ScriptedNotifier::new("email", false);
    let app = router(vec![email.clone()]);

    let (status, _) = send(&app, Method::PUT, "/posts/3", Some(r#"{"title":"x"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(email.calls(), 0);
}

#[tokio::test]
async fn repository_failures_are_500() {
    let app = router_with(Arc::new(BrokenRepo), Vec::new());

    let (status, body) = send(&app, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "repo_error");

    let (status, _) = send(&app, Method::POST, "/posts", Some(r#"{"title":"x"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
