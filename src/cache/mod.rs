//! Cache module for storing derived query results
//!
//! This module provides a TTL key-value store that persists serialized
//! query results to the filesystem, plus the deterministic cache-key
//! builder the orchestrator uses so that equivalent queries collide on
//! the same entry. The store fails open: any storage problem reads as a
//! cache miss and the request proceeds against the upstream source.

mod store;

pub use store::{CacheKey, CacheStore};
