//! HTTP transports behind the notification ports, plus wiring from settings.

mod email;
mod line;

pub use email::HttpEmailService;
pub use line::{DEFAULT_LINE_PUSH_ENDPOINT, LineMessagingService};

use std::sync::Arc;

use crate::application::notify::{
    EmailNotifier, LineNotifier, NotificationDispatcher, NotifyError, PostNotifier,
};
use crate::config::NotificationSettings;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Build the dispatcher for every enabled channel, email first.
pub fn build_dispatcher(
    settings: &NotificationSettings,
) -> Result<NotificationDispatcher, NotifyError> {
    let mut notifiers: Vec<Arc<dyn PostNotifier>> = Vec::new();

    if let Some(email) = settings.email.as_ref() {
        let service = HttpEmailService::new(
            email.endpoint.clone(),
            email.api_token.clone(),
            settings.timeout,
        )?;
        notifiers.push(Arc::new(EmailNotifier::new(
            Arc::new(service),
            email.sender.clone(),
            email.recipients.clone(),
        )));
    }

    if let Some(line) = settings.line.as_ref() {
        let service = LineMessagingService::new(
            line.endpoint.clone(),
            line.channel_token.clone(),
            settings.timeout,
        )?;
        notifiers.push(Arc::new(LineNotifier::new(
            Arc::new(service),
            line.to.clone(),
        )));
    }

    Ok(NotificationDispatcher::new(notifiers))
}

fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, NotifyError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| NotifyError::Configuration(format!("failed to build http client: {err}")))
}

async fn ensure_success(response: reqwest::Response) -> Result<(), NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let detail = match response.text().await {
        Ok(text) => text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        Err(err) => format!("unreadable response body: {err}"),
    };
    Err(NotifyError::Rejected {
        status: status.as_u16(),
        detail,
    })
}
