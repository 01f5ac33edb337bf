//! Notification delivery.
//!
//! Push handling builds a `Notification` and hands it to a `Notifier`.
//! The default notifier emits structured log events; configuring
//! `notify_webhook` switches delivery to an HTTP POST of the notification
//! JSON, for a desktop shell or relay that renders it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wheru_core::GatewayConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

/// A button attached to a displayed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A user-facing notification ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub actions: Vec<NotificationAction>,
}

/// Trait for notification delivery backends.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier that emits the notification as a structured log event.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            actions = notification.actions.len(),
            "displaying notification"
        );
        Ok(())
    }
}

/// Notifier that POSTs the notification JSON to a webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self { client: reqwest::Client::new(), url }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(notification).send().await?;

        if !response.status().is_success() {
            return Err(NotifyError::DeliveryFailed(format!(
                "webhook returned status {}",
                response.status().as_u16()
            )));
        }

        tracing::debug!(url = %self.url, "notification delivered to webhook");
        Ok(())
    }
}

/// Pick the notifier the configuration asks for.
pub fn from_config(config: &GatewayConfig) -> std::sync::Arc<dyn Notifier> {
    match &config.notify_webhook {
        Some(url) => std::sync::Arc::new(WebhookNotifier::new(url.clone())),
        None => std::sync::Arc::new(LogNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_notification() -> Notification {
        Notification {
            title: "WherU".to_string(),
            body: "Friend location updated".to_string(),
            icon: "/icon-192.png".to_string(),
            badge: "/icon-192.png".to_string(),
            vibrate: vec![200, 100, 200],
            actions: vec![
                NotificationAction { action: "view".into(), title: "View on Map".into(), icon: None },
                NotificationAction { action: "close".into(), title: "Close".into(), icon: None },
            ],
        }
    }

    #[tokio::test]
    async fn test_log_notifier() {
        let notifier = LogNotifier;
        assert!(notifier.send(&make_notification()).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_notifier_delivers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notify"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(format!("{}/notify", server.uri()));
        assert!(notifier.send(&make_notification()).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_notifier_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notify"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(format!("{}/notify", server.uri()));
        let result = notifier.send(&make_notification()).await;
        assert!(matches!(result, Err(NotifyError::DeliveryFailed(_))));
    }
}
