//! HTTP ingress: the proxy path and the gateway control endpoints.
//!
//! Every request that doesn't target `/_gateway/*` is treated as an
//! intercepted page request and routed through the fetch handler. The
//! control endpoints are the Rust-native event sources for push, sync,
//! queueing, and notification clicks.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Json, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use axum::routing::post;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::events::{Dispatcher, EventOutcome, FetchRequest, GatewayResponse, WorkerEvent};
use crate::gateway::Gateway;
use wheru_core::LocationUpdate;

/// Shared handler state: the gateway plus its dispatch table.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/_gateway/push", post(receive_push))
        .route("/_gateway/sync", post(trigger_sync))
        .route("/_gateway/location", post(queue_location))
        .route("/_gateway/notification-click", post(notification_click))
        .fallback(proxy)
        .with_state(state)
}

/// Proxy path: every non-control request becomes a fetch event.
async fn proxy(State(state): State<AppState>, request: Request) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();

    // Absolute-form request lines (standard proxy mode) carry the full
    // target; origin-form paths resolve against the configured origin.
    let target = if parts.uri.scheme().is_some() {
        parts.uri.to_string()
    } else {
        parts
            .uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_else(|| "/".to_string())
    };

    let max_bytes = state.gateway.config().max_bytes;
    let bytes = axum::body::to_bytes(body, max_bytes)
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("unreadable request body: {e}")))?;

    let fetch_request = FetchRequest {
        method: parts.method.to_string(),
        target,
        is_navigation: is_navigation(&parts.headers),
        body: if bytes.is_empty() { None } else { Some(bytes.to_vec()) },
    };

    let outcome = state
        .dispatcher
        .dispatch(state.gateway.clone(), WorkerEvent::Fetch(fetch_request))
        .await?;

    match outcome {
        EventOutcome::Response(response) => replay(response),
        _ => Err(GatewayError::InvalidRequest("unexpected fetch outcome".into())),
    }
}

/// Whether the request is a full document load.
fn is_navigation(headers: &HeaderMap) -> bool {
    if let Some(mode) = headers.get("sec-fetch-mode").and_then(|v| v.to_str().ok())
        && mode.eq_ignore_ascii_case("navigate")
    {
        return true;
    }

    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Turn a gateway response back into an HTTP response.
fn replay(response: GatewayResponse) -> Result<Response, GatewayError> {
    let mut builder = Response::builder().status(response.status);

    for (name, value) in &response.headers {
        builder = builder.header(name, value);
    }
    if let Some(content_type) = &response.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder = builder.header("x-wheru-cache", response.served.as_str());

    builder
        .body(Body::from(response.body))
        .map_err(|e| GatewayError::InvalidRequest(format!("unreplayable response: {e}")))
}

async fn receive_push(State(state): State<AppState>, payload: String) -> Result<StatusCode, GatewayError> {
    let payload = if payload.is_empty() { None } else { Some(payload) };
    state
        .dispatcher
        .dispatch(state.gateway.clone(), WorkerEvent::Push { payload })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct SyncParams {
    tag: String,
}

#[derive(Debug, Serialize)]
struct SyncReport {
    tag: String,
    ignored: bool,
    submitted: usize,
}

async fn trigger_sync(
    State(state): State<AppState>, Json(params): Json<SyncParams>,
) -> Result<Json<SyncReport>, GatewayError> {
    let outcome = state
        .dispatcher
        .dispatch(state.gateway.clone(), WorkerEvent::Sync { tag: params.tag.clone() })
        .await?;

    let report = match outcome {
        EventOutcome::SyncIgnored { tag } => SyncReport { tag, ignored: true, submitted: 0 },
        EventOutcome::Synced { submitted } => SyncReport { tag: params.tag, ignored: false, submitted },
        _ => return Err(GatewayError::InvalidRequest("unexpected sync outcome".into())),
    };

    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct QueuedReport {
    id: i64,
}

async fn queue_location(
    State(state): State<AppState>, Json(update): Json<LocationUpdate>,
) -> Result<(StatusCode, Json<QueuedReport>), GatewayError> {
    let id = state.gateway.db().enqueue_location(&update).await.map_err(GatewayError::Core)?;
    Ok((StatusCode::ACCEPTED, Json(QueuedReport { id })))
}

#[derive(Debug, Deserialize)]
struct ClickParams {
    action: String,
}

#[derive(Debug, Serialize)]
struct ClickReport {
    navigate: Option<String>,
}

async fn notification_click(
    State(state): State<AppState>, Json(params): Json<ClickParams>,
) -> Result<Json<ClickReport>, GatewayError> {
    let outcome = state
        .dispatcher
        .dispatch(state.gateway.clone(), WorkerEvent::NotificationClick { action: params.action })
        .await?;

    match outcome {
        EventOutcome::Navigate(target) => Ok(Json(ClickReport { navigate: target })),
        _ => Err(GatewayError::InvalidRequest("unexpected click outcome".into())),
    }
}
