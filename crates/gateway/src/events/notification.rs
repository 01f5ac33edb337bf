//! Notification click routing.
//!
//! The `view` action opens the application's root page; every other action
//! just dismisses the notification.

use crate::error::GatewayError;
use crate::events::EventOutcome;
use crate::events::push::ACTION_VIEW;
use crate::gateway::Gateway;
use wheru_core::Error;

/// Implementation of the notification click operation.
pub async fn click_impl(gateway: &Gateway, action: &str) -> Result<EventOutcome, GatewayError> {
    if action == ACTION_VIEW {
        let root = gateway
            .origin()
            .join("/")
            .map_err(|e| GatewayError::Core(Error::InvalidUrl(e.to_string())))?;
        tracing::info!("notification clicked, opening map");
        return Ok(EventOutcome::Navigate(Some(root.to_string())));
    }

    tracing::debug!(%action, "notification dismissed");
    Ok(EventOutcome::Navigate(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::make_gateway;

    #[tokio::test]
    async fn test_view_opens_root_page() {
        let gateway = make_gateway("http://127.0.0.1:8080").await;
        let outcome = click_impl(&gateway, "view").await.unwrap();

        match outcome {
            EventOutcome::Navigate(Some(target)) => assert_eq!(target, "http://127.0.0.1:8080/"),
            other => panic!("expected navigation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_navigates_nowhere() {
        let gateway = make_gateway("http://127.0.0.1:8080").await;
        let outcome = click_impl(&gateway, "close").await.unwrap();
        assert!(matches!(outcome, EventOutcome::Navigate(None)));
    }

    #[tokio::test]
    async fn test_unknown_action_navigates_nowhere() {
        let gateway = make_gateway("http://127.0.0.1:8080").await;
        let outcome = click_impl(&gateway, "snooze").await.unwrap();
        assert!(matches!(outcome, EventOutcome::Navigate(None)));
    }
}
