//! Core types and shared functionality for volta.
//!
//! This crate provides:
//! - Partitioned cache store with SQLite backend
//! - Request/response values
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, CachedEntry};
pub use config::{AppConfig, ConfigError, WorkerConfig};
pub use error::Error;
pub use http::{Headers, Request, RequestMode, Response, ResponseType};
