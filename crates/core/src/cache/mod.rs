//! SQLite-backed cache store partitioned by name.
//!
//! Each partition holds request -> response pairs for one cache generation.
//! Access is async via tokio-rusqlite, which serializes statements on a
//! background thread, so concurrent writes to one key settle last-writer-wins.
//!
//! - Request keys derived from method + URL (SHA-256)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-partition deletion cascades to its entries

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedEntry;
