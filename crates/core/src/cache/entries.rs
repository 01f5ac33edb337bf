//! Cache entry CRUD operations.
//!
//! Provides functions for storing, reading, and purging cached HTTP
//! responses, partitioned by generation tag.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached HTTP response.
///
/// Represents one stored response keyed by request identity, with the
/// metadata needed to replay it to a client without touching the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub key: String,
    pub generation: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers_json: String,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl CacheDb {
    /// Insert or update a cached response.
    ///
    /// Uses UPSERT semantics within a generation: inserts if the key doesn't
    /// exist, replaces the stored response if it does.
    pub async fn put_entry(&self, entry: &CachedResponse) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                upsert(conn, &entry)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of responses in a single transaction.
    ///
    /// Either every entry is written or none are. Used by install to make
    /// precaching all-or-nothing.
    pub async fn put_entries(&self, entries: Vec<CachedResponse>) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for entry in &entries {
                    upsert(&tx, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a cached response by generation and key.
    ///
    /// Returns None if no entry exists for the request identity.
    pub async fn get_entry(&self, generation: &str, key: &str) -> Result<Option<CachedResponse>, Error> {
        let generation = generation.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT generation, key, method, url, status, content_type, headers_json, body, stored_at
                     FROM cache_entries WHERE generation = ?1 AND key = ?2",
                )?;

                let result = stmt.query_row(params![generation, key], |row| {
                    Ok(CachedResponse {
                        generation: row.get(0)?,
                        key: row.get(1)?,
                        method: row.get(2)?,
                        url: row.get(3)?,
                        status: row.get::<_, i64>(4)? as u16,
                        content_type: row.get(5)?,
                        headers_json: row.get(6)?,
                        body: row.get(7)?,
                        stored_at: row.get(8)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List every generation tag present in the store.
    pub async fn list_generations(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT generation FROM cache_entries ORDER BY generation")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                let mut generations = Vec::new();
                for row in rows {
                    generations.push(row?);
                }
                Ok(generations)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry whose generation differs from `current`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_other_generations(&self, current: &str) -> Result<u64, Error> {
        let current = current.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE generation != ?1", params![current])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Count the entries stored under a generation.
    pub async fn entry_count(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

fn upsert(conn: &rusqlite::Connection, entry: &CachedResponse) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO cache_entries (
            generation, key, method, url, status, content_type, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(generation, key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            content_type = excluded.content_type,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            &entry.generation,
            &entry.key,
            &entry.method,
            &entry.url,
            entry.status as i64,
            &entry.content_type,
            &entry.headers_json,
            &entry.body,
            &entry.stored_at,
        ],
    )?;
    Ok(())
}
