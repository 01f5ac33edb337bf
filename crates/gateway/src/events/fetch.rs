//! Request handling: cache-first with network fill and offline fallback.
//!
//! Each proxied request is looked up in the current cache generation by its
//! request identity. Hits are served without touching the network. Misses go
//! upstream; successful same-origin GET responses are handed to the detached
//! writer on the way back out. When the upstream is unreachable, navigation
//! requests fall back to the precached application shell.

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use wheru_client::{FetchedResponse, is_same_origin, resolve};
use wheru_core::cache::identity::entry_key;
use wheru_core::{CachedResponse, Error};

/// An intercepted outbound request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// HTTP method, uppercase.
    pub method: String,
    /// Request target: an app-relative path-and-query, or an absolute URL
    /// for cross-origin subresources routed through the gateway.
    pub target: String,
    /// Whether this is a full document load.
    pub is_navigation: bool,
    /// Request body, forwarded upstream untouched.
    pub body: Option<Vec<u8>>,
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    Cache,
    Network,
    Fallback,
}

impl Served {
    pub fn as_str(&self) -> &'static str {
        match self {
            Served::Cache => "hit",
            Served::Network => "miss",
            Served::Fallback => "fallback",
        }
    }
}

/// A response ready to replay to the client.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub served: Served,
}

impl GatewayResponse {
    fn from_entry(entry: CachedResponse, served: Served) -> Self {
        let headers = serde_json::from_str(&entry.headers_json).unwrap_or_default();
        Self { status: entry.status, content_type: entry.content_type, headers, body: entry.body, served }
    }

    fn from_network(response: FetchedResponse) -> Self {
        Self {
            status: response.status.as_u16(),
            content_type: response.content_type.clone(),
            headers: replay_headers(&response.headers),
            body: response.bytes.to_vec(),
            served: Served::Network,
        }
    }
}

/// Implementation of the request-handling operation.
pub async fn fetch_impl(gateway: &Gateway, request: FetchRequest) -> Result<GatewayResponse, GatewayError> {
    let url =
        resolve(gateway.origin(), &request.target).map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    let key = entry_key(&request.method, url.as_str());
    let generation = gateway.generation();

    if let Some(entry) = gateway.db().get_entry(generation, &key).await.map_err(GatewayError::Core)? {
        tracing::debug!(method = %request.method, %url, "serving from cache");
        return Ok(GatewayResponse::from_entry(entry, Served::Cache));
    }

    let method = Method::from_bytes(request.method.as_bytes())
        .map_err(|e| GatewayError::InvalidRequest(format!("bad method: {e}")))?;
    let body = request.body.map(Bytes::from);

    tracing::debug!(method = %request.method, %url, "fetching from network");
    match gateway.client().request(method, &url, body).await {
        Ok(response) => {
            if should_cache(&request.method, &response, gateway.origin(), &url) {
                gateway
                    .writer()
                    .enqueue(cache_entry(generation, &request.method, &url, &response))
                    .await;
            }
            Ok(GatewayResponse::from_network(response))
        }
        Err(err @ (Error::FetchFailed(_) | Error::FetchTimeout(_))) => {
            if request.is_navigation
                && let Some(shell) =
                    gateway.db().get_entry(generation, gateway.shell_key()).await.map_err(GatewayError::Core)?
            {
                tracing::warn!(%url, "upstream unreachable, serving cached shell");
                return Ok(GatewayResponse::from_entry(shell, Served::Fallback));
            }
            Err(GatewayError::Upstream(err.to_string()))
        }
        Err(other) => Err(GatewayError::Core(other)),
    }
}

/// Only successful same-origin GET responses are stored.
fn should_cache(method: &str, response: &FetchedResponse, origin: &Url, url: &Url) -> bool {
    method.eq_ignore_ascii_case("GET") && response.status == StatusCode::OK && is_same_origin(origin, url)
}

/// Build a storable entry from an upstream response.
pub(crate) fn cache_entry(generation: &str, method: &str, url: &Url, response: &FetchedResponse) -> CachedResponse {
    CachedResponse {
        key: entry_key(method, url.as_str()),
        generation: generation.to_string(),
        method: method.to_ascii_uppercase(),
        url: url.to_string(),
        status: response.status.as_u16(),
        content_type: response.content_type.clone(),
        headers_json: serde_json::to_string(&replay_headers(&response.headers)).unwrap_or_else(|_| "[]".into()),
        body: response.bytes.to_vec(),
        stored_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Headers safe to replay to the client.
///
/// Hop-by-hop and framing headers are dropped; the body is stored decoded
/// and re-framed on the way out. Content-Type travels separately.
fn replay_headers(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    const SKIP: &[&str] = &[
        "connection",
        "keep-alive",
        "transfer-encoding",
        "content-length",
        "content-encoding",
        "content-type",
        "upgrade",
        "proxy-authenticate",
        "proxy-authorization",
        "te",
        "trailer",
    ];

    headers
        .iter()
        .filter(|(name, _)| !SKIP.contains(&name.as_str()))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}
