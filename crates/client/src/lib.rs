//! Network side of volta.
//!
//! This crate provides the network-fetch primitive the worker depends on,
//! plus URL resolution against the worker scope.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, Network, UrlError, is_streaming, resolve, same_origin};
