//! SQLite-backed versioned cache for HTTP responses and the sync queue.
//!
//! This module provides the gateway's only persistent state, using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Versioned response storage partitioned by generation tag
//! - Request-identity keys via SHA-256 hashing
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Wholesale purge of stale generations
//! - A persistent queue of pending location updates

pub mod connection;
pub mod entries;
pub mod identity;
pub mod migrations;
pub mod queue;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedResponse;
pub use queue::{LocationUpdate, PendingLocation};
