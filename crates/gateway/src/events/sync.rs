//! Background sync: submit queued location updates.
//!
//! A single recognized tag triggers submission; anything else is ignored.
//! Queued rows are deleted only after the endpoint accepts the batch, and a
//! failed submission propagates to the invoking scheduler, which owns the
//! retry policy.

use crate::error::GatewayError;
use crate::events::EventOutcome;
use crate::gateway::Gateway;
use wheru_client::resolve;
use wheru_core::Error;

/// The one sync tag the gateway acts on.
pub const SYNC_TAG: &str = "location-sync";

/// Updates submitted per trigger.
const SYNC_BATCH_LIMIT: usize = 100;

/// Implementation of the background sync operation.
pub async fn sync_impl(gateway: &Gateway, tag: &str) -> Result<EventOutcome, GatewayError> {
    if tag != SYNC_TAG {
        tracing::debug!(%tag, "ignoring unrecognized sync tag");
        return Ok(EventOutcome::SyncIgnored { tag: tag.to_string() });
    }

    let pending = gateway.db().pending_locations(SYNC_BATCH_LIMIT).await.map_err(GatewayError::Core)?;
    if pending.is_empty() {
        tracing::debug!("location sync triggered with empty queue");
        return Ok(EventOutcome::Synced { submitted: 0 });
    }

    let endpoint = resolve(gateway.origin(), &gateway.config().sync_endpoint)
        .map_err(|e| GatewayError::Core(Error::InvalidUrl(format!("sync_endpoint: {e}"))))?;
    let updates: Vec<_> = pending.iter().map(|p| &p.update).collect();

    tracing::info!(pending = pending.len(), %endpoint, "syncing location data in background");
    let status = gateway.client().post_json(&endpoint, &updates).await.inspect_err(|e| {
        tracing::error!(error = %e, "location sync failed");
    })?;

    if !status.is_success() {
        let err = Error::SyncFailed(format!("status {}", status.as_u16()));
        tracing::error!(error = %err, "location sync rejected by endpoint");
        return Err(err.into());
    }

    let ids: Vec<i64> = pending.iter().map(|p| p.id).collect();
    gateway.db().remove_locations(&ids).await.map_err(GatewayError::Core)?;

    tracing::info!(submitted = ids.len(), "location sync complete");
    Ok(EventOutcome::Synced { submitted: ids.len() })
}
