//! Persistent queue of pending location updates.
//!
//! Updates recorded while offline wait here until a background sync
//! trigger drains them. Rows are only removed after a successful
//! submission, so a failed sync leaves the queue intact for the
//! scheduler's next attempt.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// One location update awaiting submission to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    pub recorded_at: String,
}

/// A queued update together with its queue row id.
#[derive(Debug, Clone)]
pub struct PendingLocation {
    pub id: i64,
    pub update: LocationUpdate,
}

impl CacheDb {
    /// Append a location update to the queue.
    pub async fn enqueue_location(&self, update: &LocationUpdate) -> Result<i64, Error> {
        let recorded_at = update.recorded_at.clone();
        let payload =
            serde_json::to_string(update).map_err(|e| Error::InvalidInput(format!("unserializable update: {e}")))?;
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO sync_queue (payload_json, recorded_at) VALUES (?1, ?2)",
                    params![payload, recorded_at],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::from)
    }

    /// Read up to `limit` pending updates in insertion order.
    pub async fn pending_locations(&self, limit: usize) -> Result<Vec<PendingLocation>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<PendingLocation>, Error> {
                let mut stmt =
                    conn.prepare("SELECT id, payload_json FROM sync_queue ORDER BY id ASC LIMIT ?1")?;
                let rows = stmt.query_map(params![limit], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?;

                let mut pending = Vec::new();
                for row in rows {
                    let (id, payload) = row?;
                    let update: LocationUpdate = serde_json::from_str(&payload)
                        .map_err(|e| Error::InvalidInput(format!("corrupt queue row {id}: {e}")))?;
                    pending.push(PendingLocation { id, update });
                }
                Ok(pending)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove submitted rows from the queue.
    ///
    /// Returns the number of deleted rows.
    pub async fn remove_locations(&self, ids: &[i64]) -> Result<u64, Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids = ids.to_vec();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let mut deleted = 0usize;
                for id in &ids {
                    deleted += tx.execute("DELETE FROM sync_queue WHERE id = ?1", params![id])?;
                }
                tx.commit()?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of updates currently waiting.
    pub async fn queue_len(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_update(latitude: f64) -> LocationUpdate {
        LocationUpdate {
            latitude,
            longitude: -122.4,
            accuracy: Some(12.0),
            recorded_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_enqueue_and_pending_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.enqueue_location(&make_update(37.0)).await.unwrap();
        db.enqueue_location(&make_update(38.0)).await.unwrap();
        db.enqueue_location(&make_update(39.0)).await.unwrap();

        let pending = db.pending_locations(10).await.unwrap();
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].update.latitude, 37.0);
        assert_eq!(pending[2].update.latitude, 39.0);
    }

    #[tokio::test]
    async fn test_pending_respects_limit() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for i in 0..5 {
            db.enqueue_location(&make_update(i as f64)).await.unwrap();
        }

        let pending = db.pending_locations(2).await.unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_locations() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let first = db.enqueue_location(&make_update(37.0)).await.unwrap();
        let second = db.enqueue_location(&make_update(38.0)).await.unwrap();

        let deleted = db.remove_locations(&[first, second]).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(db.queue_len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_empty_is_noop() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.enqueue_location(&make_update(37.0)).await.unwrap();

        let deleted = db.remove_locations(&[]).await.unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(db.queue_len().await.unwrap(), 1);
    }
}
