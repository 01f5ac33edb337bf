//! Push handling: map an incoming payload to a displayed notification.

use crate::error::GatewayError;
use crate::events::EventOutcome;
use crate::gateway::Gateway;
use crate::notify::{Notification, NotificationAction};

pub const NOTIFICATION_TITLE: &str = "WherU";
pub const DEFAULT_BODY: &str = "Friend location updated";
pub const ACTION_VIEW: &str = "view";
pub const ACTION_CLOSE: &str = "close";

const ICON_PATH: &str = "/icon-192.png";
const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

/// Build the notification for a push payload.
///
/// The payload text becomes the body; a missing or empty payload falls back
/// to the default body. Everything else is fixed.
pub fn build_notification(payload: Option<&str>) -> Notification {
    let body = payload.filter(|text| !text.is_empty()).unwrap_or(DEFAULT_BODY).to_string();

    Notification {
        title: NOTIFICATION_TITLE.to_string(),
        body,
        icon: ICON_PATH.to_string(),
        badge: ICON_PATH.to_string(),
        vibrate: VIBRATE_PATTERN.to_vec(),
        actions: vec![
            NotificationAction {
                action: ACTION_VIEW.to_string(),
                title: "View on Map".to_string(),
                icon: Some(ICON_PATH.to_string()),
            },
            NotificationAction { action: ACTION_CLOSE.to_string(), title: "Close".to_string(), icon: None },
        ],
    }
}

/// Implementation of the push operation.
pub async fn push_impl(gateway: &Gateway, payload: Option<String>) -> Result<EventOutcome, GatewayError> {
    let notification = build_notification(payload.as_deref());
    tracing::info!(body = %notification.body, "push received");

    gateway.notifier().send(&notification).await?;

    Ok(EventOutcome::NotificationShown(notification))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{RecordingNotifier, make_gateway_with_notifier};
    use std::sync::Arc;

    #[test]
    fn test_payload_becomes_body() {
        let notification = build_notification(Some("Ada is nearby"));
        assert_eq!(notification.body, "Ada is nearby");
        assert_eq!(notification.title, NOTIFICATION_TITLE);
    }

    #[test]
    fn test_missing_payload_uses_default_body() {
        let notification = build_notification(None);
        assert_eq!(notification.body, DEFAULT_BODY);
    }

    #[test]
    fn test_empty_payload_uses_default_body() {
        let notification = build_notification(Some(""));
        assert_eq!(notification.body, DEFAULT_BODY);
    }

    #[test]
    fn test_fixed_fields() {
        let notification = build_notification(None);
        assert_eq!(notification.icon, "/icon-192.png");
        assert_eq!(notification.badge, "/icon-192.png");
        assert_eq!(notification.vibrate, vec![200, 100, 200]);

        let actions: Vec<&str> = notification.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec![ACTION_VIEW, ACTION_CLOSE]);
    }

    #[tokio::test]
    async fn test_push_delivers_through_notifier() {
        let notifier = Arc::new(RecordingNotifier::default());
        let gateway = make_gateway_with_notifier("http://127.0.0.1:8080", notifier.clone()).await;

        let outcome = push_impl(&gateway, Some("Grace checked in".into())).await.unwrap();

        assert!(matches!(outcome, EventOutcome::NotificationShown(_)));
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "Grace checked in");
    }
}
