//! Offline asset cache.
//!
//! This module provides a cache-first layer for a fixed set of static assets:
//! - Pre-populates a named, versioned store on install (all or nothing)
//! - Answers requests from the store, falling back to the network on a miss
//! - Removes older versions of the store on activation

mod layer;
mod network;
mod storage;
mod traits;
mod worker;

pub use layer::AssetCache;
pub use network::{Fetch, HttpFetcher};
pub use storage::{CacheStorage, SqliteStorage};
pub use traits::{AssetRequest, AssetResponse, CacheName};
pub use worker::AssetWorker;
