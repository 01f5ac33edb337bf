//! Install: precache the application shell into a fresh generation.
//!
//! Every URL on the precache list is fetched and the responses are written
//! in one transaction, so a partially precached generation never exists.
//! Any failure aborts the install and leaves the previous generation in
//! control.

use crate::error::GatewayError;
use crate::events::EventOutcome;
use crate::events::fetch::cache_entry;
use crate::gateway::Gateway;
use wheru_client::resolve;
use wheru_core::{CachedResponse, Error};

/// Implementation of the install operation.
pub async fn install_impl(gateway: &Gateway) -> Result<EventOutcome, GatewayError> {
    gateway.lifecycle().begin_install()?;
    tracing::info!(
        generation = %gateway.generation(),
        assets = gateway.config().precache.len(),
        "installing, caching app shell"
    );

    let mut entries = Vec::with_capacity(gateway.config().precache.len());
    for asset in &gateway.config().precache {
        match precache_asset(gateway, asset).await {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                gateway.lifecycle().fail();
                tracing::error!(%asset, error = %err, "precache failed, aborting install");
                return Err(err);
            }
        }
    }

    let precached = entries.len();
    if let Err(err) = gateway.db().put_entries(entries).await {
        gateway.lifecycle().fail();
        return Err(GatewayError::Core(err));
    }

    gateway.lifecycle().finish_install()?;
    tracing::info!(precached, "app shell cached, skipping waiting");
    Ok(EventOutcome::Installed { precached })
}

async fn precache_asset(gateway: &Gateway, asset: &str) -> Result<CachedResponse, GatewayError> {
    let url = resolve(gateway.origin(), asset)
        .map_err(|e| GatewayError::Core(Error::PrecacheFailed(format!("{asset}: {e}"))))?;

    let response = gateway
        .client()
        .get(&url)
        .await
        .map_err(|e| GatewayError::Core(Error::PrecacheFailed(format!("{asset}: {e}"))))?;

    if !response.status.is_success() {
        return Err(GatewayError::Core(Error::PrecacheFailed(format!(
            "status {} for {asset}",
            response.status.as_u16()
        ))));
    }

    Ok(cache_entry(gateway.generation(), "GET", &url, &response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::make_gateway_with;
    use crate::worker::WorkerState;
    use wheru_core::GatewayConfig;
    use wheru_core::cache::identity::entry_key;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn shell_config() -> GatewayConfig {
        GatewayConfig {
            precache: vec!["/".into(), "/index.html".into(), "/manifest.json".into()],
            ..Default::default()
        }
    }

    async fn mount_shell(server: &MockServer) {
        for (p, body) in [
            ("/", "<html>root</html>"),
            ("/index.html", "<html>shell</html>"),
            ("/manifest.json", "{\"name\":\"WherU\"}"),
        ] {
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(server)
                .await;
        }
    }

    #[tokio::test]
    async fn test_install_precaches_every_asset() {
        let server = MockServer::start().await;
        mount_shell(&server).await;

        let gateway = make_gateway_with(&server.uri(), shell_config()).await;
        let outcome = install_impl(&gateway).await.unwrap();

        assert!(matches!(outcome, EventOutcome::Installed { precached: 3 }));
        assert_eq!(gateway.db().entry_count(gateway.generation()).await.unwrap(), 3);
        assert_eq!(gateway.lifecycle().state(), WorkerState::Waiting);

        for asset in &gateway.config().precache {
            let url = resolve(gateway.origin(), asset).unwrap();
            let stored = gateway
                .db()
                .get_entry(gateway.generation(), &entry_key("GET", url.as_str()))
                .await
                .unwrap();
            assert!(stored.is_some(), "{asset} should be precached");
        }
    }

    #[tokio::test]
    async fn test_failed_asset_aborts_install_with_nothing_written() {
        let server = MockServer::start().await;
        for p in ["/", "/index.html"] {
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/manifest.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let gateway = make_gateway_with(&server.uri(), shell_config()).await;
        let result = install_impl(&gateway).await;

        assert!(matches!(result, Err(GatewayError::Core(Error::PrecacheFailed(_)))));
        assert_eq!(gateway.db().entry_count(gateway.generation()).await.unwrap(), 0);
        assert_eq!(gateway.lifecycle().state(), WorkerState::Redundant);
    }

    #[tokio::test]
    async fn test_unreachable_origin_aborts_install() {
        let gateway = make_gateway_with("http://127.0.0.1:1", shell_config()).await;
        let result = install_impl(&gateway).await;

        assert!(matches!(result, Err(GatewayError::Core(Error::PrecacheFailed(_)))));
        assert_eq!(gateway.lifecycle().state(), WorkerState::Redundant);
    }
}
