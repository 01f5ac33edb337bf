//! Activate: purge stale cache generations and claim all clients.

use crate::error::GatewayError;
use crate::events::EventOutcome;
use crate::gateway::Gateway;

/// Implementation of the activate operation.
pub async fn activate_impl(gateway: &Gateway) -> Result<EventOutcome, GatewayError> {
    gateway.lifecycle().begin_activate()?;
    let current = gateway.generation();
    tracing::info!(generation = %current, "activating");

    let generations = gateway.db().list_generations().await.map_err(GatewayError::Core)?;
    for generation in &generations {
        if generation != current {
            tracing::info!(stale = %generation, "deleting old cache generation");
        }
    }

    let purged = gateway.db().purge_other_generations(current).await.map_err(GatewayError::Core)?;

    gateway.lifecycle().finish_activate()?;
    tracing::info!(purged, "activated, claiming all clients");
    Ok(EventOutcome::Activated { purged })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::make_gateway;
    use wheru_core::CachedResponse;
    use wheru_core::cache::identity::entry_key;

    fn entry(generation: &str, url: &str) -> CachedResponse {
        CachedResponse {
            key: entry_key("GET", url),
            generation: generation.to_string(),
            method: "GET".into(),
            url: url.to_string(),
            status: 200,
            content_type: None,
            headers_json: "[]".into(),
            body: Vec::new(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_activate_purges_stale_generations() {
        let gateway = make_gateway("http://127.0.0.1:8080").await;
        gateway.lifecycle().begin_install().unwrap();
        gateway.lifecycle().finish_install().unwrap();

        let db = gateway.db();
        db.put_entry(&entry("wheru-v0.8.0", "http://127.0.0.1:8080/")).await.unwrap();
        db.put_entry(&entry("wheru-v0.9.0", "http://127.0.0.1:8080/")).await.unwrap();
        db.put_entry(&entry(gateway.generation(), "http://127.0.0.1:8080/")).await.unwrap();

        let outcome = activate_impl(&gateway).await.unwrap();

        assert!(matches!(outcome, EventOutcome::Activated { purged: 2 }));
        assert_eq!(db.list_generations().await.unwrap(), vec![gateway.generation().to_string()]);
        assert!(gateway.lifecycle().is_activated());
    }

    #[tokio::test]
    async fn test_activate_requires_waiting_state() {
        let gateway = make_gateway("http://127.0.0.1:8080").await;
        let result = activate_impl(&gateway).await;
        assert!(matches!(result, Err(GatewayError::Lifecycle(_))));
    }
}
