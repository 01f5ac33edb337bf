//! Structured errors for the gateway, mapped onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::notify::NotifyError;
use crate::worker::TransitionError;
use wheru_core::Error;

/// Structured errors for the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Shared core error (cache, config, fetch).
    #[error(transparent)]
    Core(#[from] Error),

    /// Upstream unreachable and no cached fallback applies.
    #[error("BAD_GATEWAY: {0}")]
    Upstream(String),

    /// Malformed incoming request.
    #[error("INVALID_REQUEST: {0}")]
    InvalidRequest(String),

    /// Notification delivery failed.
    #[error("NOTIFY_FAILED: {0}")]
    Notify(#[from] NotifyError),

    /// Lifecycle transition violation.
    #[error(transparent)]
    Lifecycle(#[from] TransitionError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Core(Error::InvalidInput(_) | Error::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            GatewayError::Core(Error::FetchFailed(_) | Error::FetchTimeout(_)) => StatusCode::BAD_GATEWAY,
            GatewayError::Core(Error::FetchTooLarge(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_maps_to_502() {
        let response = GatewayError::Upstream("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_request_maps_to_400() {
        let response = GatewayError::InvalidRequest("empty tag".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_maps_to_500() {
        let err = GatewayError::Core(Error::MigrationFailed("boom".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
