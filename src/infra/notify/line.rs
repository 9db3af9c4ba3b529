use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::notify::{LineService, NotifyError};

use super::{ensure_success, http_client};

pub const DEFAULT_LINE_PUSH_ENDPOINT: &str = "https://api.line.me/v2/bot/message/push";

/// Pushes text messages through the LINE Messaging API.
pub struct LineMessagingService {
    client: reqwest::Client,
    endpoint: String,
    channel_token: String,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl LineMessagingService {
    pub fn new(
        endpoint: impl Into<String>,
        channel_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: endpoint.into(),
            channel_token: channel_token.into(),
        })
    }
}

#[async_trait]
impl LineService for LineMessagingService {
    async fn push_message(&self, to: &str, text: &str) -> Result<(), NotifyError> {
        let payload = PushRequest {
            to,
            messages: [TextMessage { kind: "text", text }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.channel_token)
            .json(&payload)
            .send()
            .await
            .map_err(NotifyError::transport)?;
        ensure_success(response).await
    }
}
