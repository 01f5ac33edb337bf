//! Client code for the WherU offline gateway.
//!
//! This crate provides the HTTP fetch pipeline shared by the gateway's
//! precache, runtime proxy, and background sync paths.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, FetchedResponse, is_same_origin, resolve};
