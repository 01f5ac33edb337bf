//! HTTP fetch pipeline for the offline gateway.
//!
//! ### Passthrough semantics
//! - Any HTTP status is returned to the caller as a response; only
//!   transport-level failures (DNS, refused connection, timeout) are errors.
//!   The gateway decides what to cache and what to fall back to.
//!
//! ### Limits
//! - Request timeout (default: 20s)
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod url;

use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, Method, StatusCode, header};
use serde::Serialize;
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize, is_same_origin, resolve};

use wheru_core::Error;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "wheru-gateway/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "wheru-gateway/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// HTTP fetch client with passthrough semantics and byte limits.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::FetchFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL with GET, returning raw bytes and metadata.
    pub async fn get(&self, url: &Url) -> Result<FetchedResponse, Error> {
        self.request(Method::GET, url, None).await
    }

    /// Forward a request upstream, returning raw bytes and metadata.
    ///
    /// Non-success statuses are returned as responses, not errors; the
    /// caller inspects `status` to decide on caching. Transport failures
    /// and oversized bodies are errors.
    pub async fn request(&self, method: Method, url: &Url, body: Option<Bytes>) -> Result<FetchedResponse, Error> {
        let start = Instant::now();

        let mut request = self.http.request(method, url.as_str());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();

        let content_length = response.content_length();
        if let Some(len) = content_length
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                len, self.config.max_bytes
            )));
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::FetchFailed(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes, status {})",
            url,
            final_url,
            fetch_ms,
            bytes.len(),
            status.as_u16()
        );

        Ok(FetchedResponse { url: url.clone(), final_url, status, content_type, bytes, headers, fetch_ms })
    }

    /// POST a JSON body, returning the response status.
    ///
    /// Used by background sync to submit queued location updates.
    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &Url, body: &T) -> Result<StatusCode, Error> {
        let response = self
            .http
            .post(url.as_str())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        Ok(response.status())
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else {
        Error::FetchFailed(format!("network error: {}", err))
    }
}
