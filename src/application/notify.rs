//! Post change notifications.
//!
//! Every notifier implements [`PostNotifier`] and the dispatcher invokes them uniformly, in
//! registration order. A failing notifier never prevents the remaining ones from running; the
//! failures are collected into a [`DispatchReport`] instead.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use metrics::counter;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::entities::Post;
use crate::domain::types::PostAction;

pub const EMAIL_SUBJECT: &str = "Post Update Notification";
pub const DEFAULT_EMAIL_SENDER: &str = "noreply@example.com";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream rejected notification with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("notifier misconfigured: {0}")]
    Configuration(String),
}

impl NotifyError {
    pub fn transport(err: impl fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Outbound mail transport.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_email(
        &self,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError>;
}

/// Outbound LINE messaging transport.
#[async_trait]
pub trait LineService: Send + Sync {
    async fn push_message(&self, to: &str, text: &str) -> Result<(), NotifyError>;
}

/// Something that relays a post change to the outside world.
#[async_trait]
pub trait PostNotifier: Send + Sync {
    /// Short, stable channel name used in logs, metrics and error reports.
    fn channel(&self) -> &'static str;

    async fn notify_post_changed(&self, post: &Post, action: PostAction)
    -> Result<(), NotifyError>;
}

/// Human readable description of a change, shared by every text channel.
pub fn describe_change(post: &Post, action: PostAction) -> String {
    format!(
        "The post has been updated with the following details:\nTitle: {}\nBody: {}\nAction: {}",
        post.title, post.body, action
    )
}

pub struct EmailNotifier {
    service: Arc<dyn EmailService>,
    sender: String,
    recipients: Vec<String>,
}

impl EmailNotifier {
    pub fn new(service: Arc<dyn EmailService>, sender: String, recipients: Vec<String>) -> Self {
        Self {
            service,
            sender,
            recipients,
        }
    }
}

#[async_trait]
impl PostNotifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn notify_post_changed(
        &self,
        post: &Post,
        action: PostAction,
    ) -> Result<(), NotifyError> {
        let body = describe_change(post, action);
        for recipient in &self.recipients {
            self.service
                .send_email(&self.sender, recipient, EMAIL_SUBJECT, &body)
                .await?;
        }
        Ok(())
    }
}

pub struct LineNotifier {
    service: Arc<dyn LineService>,
    to: String,
}

impl LineNotifier {
    pub fn new(service: Arc<dyn LineService>, to: String) -> Self {
        Self { service, to }
    }
}

#[async_trait]
impl PostNotifier for LineNotifier {
    fn channel(&self) -> &'static str {
        "line"
    }

    async fn notify_post_changed(
        &self,
        post: &Post,
        action: PostAction,
    ) -> Result<(), NotifyError> {
        let text = describe_change(post, action);
        self.service.push_message(&self.to, &text).await
    }
}

#[derive(Debug)]
pub struct DeliveryFailure {
    pub channel: &'static str,
    pub error: NotifyError,
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub delivered: Vec<&'static str>,
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<&'static str>, DispatchFailure> {
        if self.failures.is_empty() {
            Ok(self.delivered)
        } else {
            Err(DispatchFailure {
                failures: self.failures,
            })
        }
    }
}

/// One or more notifiers failed while relaying a change.
#[derive(Debug, Error)]
#[error("{} notifier(s) failed: {}", .failures.len(), list_failures(.failures))]
pub struct DispatchFailure {
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchFailure {
    pub fn channels(&self) -> Vec<&'static str> {
        self.failures.iter().map(|failure| failure.channel).collect()
    }
}

fn list_failures(failures: &[DeliveryFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.channel, failure.error))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn PostNotifier>>,
}

impl NotificationDispatcher {
    pub fn new(notifiers: Vec<Arc<dyn PostNotifier>>) -> Self {
        Self { notifiers }
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn channels(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.channel()).collect()
    }

    pub async fn dispatch(&self, post: &Post, action: PostAction) -> DispatchReport {
        let mut report = DispatchReport::default();

        for notifier in &self.notifiers {
            let channel = notifier.channel();
            match notifier.notify_post_changed(post, action).await {
                Ok(()) => {
                    counter!("postboard_notifications_delivered_total", "channel" => channel)
                        .increment(1);
                    debug!(
                        target = "postboard::notify",
                        channel,
                        post_id = %post.id,
                        action = action.as_str(),
                        "notification delivered"
                    );
                    report.delivered.push(channel);
                }
                Err(error) => {
                    counter!("postboard_notifications_failed_total", "channel" => channel)
                        .increment(1);
                    warn!(
                        target = "postboard::notify",
                        channel,
                        post_id = %post.id,
                        action = action.as_str(),
                        error = %error,
                        "notification failed"
                    );
                    report.failures.push(DeliveryFailure { channel, error });
                }
            }
        }

        report
    }
}
