//! Gateway configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WHERU_*)
//! 2. TOML config file (if WHERU_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Gateway configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WHERU_*)
/// 2. TOML config file (if WHERU_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Address the gateway listens on.
    ///
    /// Set via WHERU_LISTEN_ADDR environment variable.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Base URL of the WherU application origin the gateway fronts.
    ///
    /// Relative precache entries and proxied request paths resolve
    /// against this URL. Set via WHERU_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite cache database.
    ///
    /// Set via WHERU_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Version tag naming the current cache generation.
    ///
    /// Set via WHERU_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Path of the application shell served as the offline navigation
    /// fallback. Must appear in the precache list.
    ///
    /// Set via WHERU_SHELL_PATH environment variable.
    #[serde(default = "default_shell_path")]
    pub shell_path: String,

    /// URLs fetched and stored during install. Relative entries resolve
    /// against `origin`; absolute entries are fetched as-is.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Endpoint queued location updates are submitted to on background
    /// sync. Relative paths resolve against `origin`.
    ///
    /// Set via WHERU_SYNC_ENDPOINT environment variable.
    #[serde(default = "default_sync_endpoint")]
    pub sync_endpoint: String,

    /// Optional webhook URL push notifications are delivered to. When
    /// unset, notifications are emitted through structured logging.
    ///
    /// Set via WHERU_NOTIFY_WEBHOOK environment variable.
    #[serde(default)]
    pub notify_webhook: Option<String>,

    /// User-Agent string for upstream HTTP requests.
    ///
    /// Set via WHERU_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream request timeout in milliseconds.
    ///
    /// Set via WHERU_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per upstream response.
    ///
    /// Set via WHERU_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8787".into()
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./wheru-gateway-cache.sqlite")
}

fn default_cache_version() -> String {
    "wheru-v1.0.0".into()
}

fn default_shell_path() -> String {
    "/index.html".into()
}

fn default_precache() -> Vec<String> {
    vec![
        "/".into(),
        "/index.html".into(),
        "/manifest.json".into(),
        "/logo.png".into(),
        "/icon-192.png".into(),
        "/icon-512.png".into(),
        "https://unpkg.com/leaflet@1.7.1/dist/leaflet.css".into(),
        "https://unpkg.com/leaflet@1.7.1/dist/leaflet.js".into(),
    ]
}

fn default_sync_endpoint() -> String {
    "/api/sync-location".into()
}

fn default_user_agent() -> String {
    "wheru-gateway/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            origin: default_origin(),
            db_path: default_db_path(),
            cache_version: default_cache_version(),
            shell_path: default_shell_path(),
            precache: default_precache(),
            sync_endpoint: default_sync_endpoint(),
            notify_webhook: None,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl GatewayConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WHERU_`
    /// 2. TOML file from `WHERU_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WHERU_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WHERU_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
