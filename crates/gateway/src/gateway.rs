//! The gateway service: shared state handed to every event handler.

use std::sync::Arc;

use url::Url;

use crate::error::GatewayError;
use crate::notify::Notifier;
use crate::worker::Lifecycle;
use crate::writer::CacheWriter;
use wheru_client::FetchClient;
use wheru_core::cache::identity::entry_key;
use wheru_core::{CacheDb, GatewayConfig};

/// Shared state for the offline cache gateway.
///
/// Owns the cache store, the upstream fetch client, the detached cache
/// writer, the notifier, and the worker lifecycle. Event handlers borrow
/// this; nothing else holds mutable state.
pub struct Gateway {
    config: GatewayConfig,
    origin: Url,
    shell_key: String,
    db: CacheDb,
    client: FetchClient,
    writer: CacheWriter,
    notifier: Arc<dyn Notifier>,
    lifecycle: Lifecycle,
}

impl Gateway {
    /// Build the gateway from its parts.
    ///
    /// Parses the configured origin and precomputes the shell's request
    /// identity so the offline fallback is a single cache lookup.
    pub fn new(
        config: GatewayConfig, db: CacheDb, client: FetchClient, notifier: Arc<dyn Notifier>,
    ) -> Result<Self, GatewayError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| GatewayError::Core(wheru_core::Error::InvalidUrl(format!("origin: {e}"))))?;
        let shell_url = wheru_client::resolve(&origin, &config.shell_path)
            .map_err(|e| GatewayError::Core(wheru_core::Error::InvalidUrl(format!("shell_path: {e}"))))?;
        let shell_key = entry_key("GET", shell_url.as_str());

        let writer = CacheWriter::spawn(db.clone());

        Ok(Self { config, origin, shell_key, db, client, writer, notifier, lifecycle: Lifecycle::new() })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The application origin proxied requests resolve against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// The active cache generation tag.
    pub fn generation(&self) -> &str {
        &self.config.cache_version
    }

    /// Request identity of the precached application shell.
    pub fn shell_key(&self) -> &str {
        &self.shell_key
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    pub fn writer(&self) -> &CacheWriter {
        &self.writer
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
