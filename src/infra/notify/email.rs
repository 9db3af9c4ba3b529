use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::notify::{EmailService, NotifyError};

use super::{ensure_success, http_client};

/// Sends mail by posting JSON to an HTTP mail relay.
pub struct HttpEmailService {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpEmailService {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: endpoint.into(),
            api_token,
        })
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send_email(
        &self,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        let mut request = self.client.post(&self.endpoint).json(&OutgoingEmail {
            from: sender,
            to: recipient,
            subject,
            text: body,
        });
        if let Some(token) = self.api_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(NotifyError::transport)?;
        ensure_success(response).await
    }
}
