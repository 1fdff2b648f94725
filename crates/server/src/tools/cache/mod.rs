//! Cache-related MCP tools.
//!
//! This module provides read access to the partitioned cache store.

pub mod keys;

pub use keys::{CacheKeysParams, keys_impl};
