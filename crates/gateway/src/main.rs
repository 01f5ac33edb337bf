//! WherU offline gateway entry point.
//!
//! Boots the gateway: loads configuration, opens the cache store, runs the
//! install and activate events through the dispatch table, and serves the
//! proxy plus control endpoints. Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod error;
mod events;
mod gateway;
mod http;
mod notify;
mod worker;
mod writer;

use events::{Dispatcher, WorkerEvent};
use gateway::Gateway;
use wheru_client::{FetchClient, FetchConfig};
use wheru_core::{CacheDb, GatewayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = GatewayConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        generation = %config.cache_version,
        "starting WherU offline gateway"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let client = FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    })?;
    let notifier = notify::from_config(&config);

    let listen_addr = config.listen_addr.clone();
    let gateway = Arc::new(Gateway::new(config, db, client, notifier)?);
    let dispatcher = Arc::new(Dispatcher::new());

    dispatcher.dispatch(gateway.clone(), WorkerEvent::Install).await?;
    dispatcher.dispatch(gateway.clone(), WorkerEvent::Activate).await?;

    let app = http::router(http::AppState { gateway, dispatcher });
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listen_addr, "gateway serving");

    axum::serve(listener, app).await?;

    Ok(())
}
