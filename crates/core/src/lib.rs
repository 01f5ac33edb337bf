//! Core types and shared functionality for the WherU offline gateway.
//!
//! This crate provides:
//! - Versioned response cache with SQLite backend
//! - Persistent queue for pending location updates
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedResponse, LocationUpdate};
pub use config::GatewayConfig;
pub use error::Error;
