//! sw_fetch tool implementation.
//!
//! Plays a page request through the worker's fetch policy and reports where
//! the answer came from.

use std::collections::BTreeMap;

use bytes::Bytes;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use volta_client::resolve;
use volta_core::{Error, Headers, Request, RequestMode};
use volta_worker::{Event, FetchOutcome, Outcome, Worker};

use super::{dispatch_and_settle, json_result};
use crate::error::HostError;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Request URL, absolute or relative to the worker scope.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers, e.g. `{"Accept": "text/html"}`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request mode; decides how cross-origin responses are typed.
    #[serde(default)]
    pub mode: FetchMode,

    /// Optional request body as text.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

impl From<FetchMode> for RequestMode {
    fn from(mode: FetchMode) -> Self {
        match mode {
            FetchMode::Navigate => RequestMode::Navigate,
            FetchMode::SameOrigin => RequestMode::SameOrigin,
            FetchMode::NoCors => RequestMode::NoCors,
            FetchMode::Cors => RequestMode::Cors,
        }
    }
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    /// passthrough, cache, network, fallback or unresolved.
    pub source: String,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    /// basic, cors, opaque or error.
    pub response_type: Option<String>,
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: Option<String>,
    /// Whether a copy was written to the current partition.
    pub stored: bool,
    /// Why nothing could answer the request, for `unresolved`.
    pub reason: Option<String>,
    /// Failure of the background cache write, if any.
    pub cache_write_error: Option<String>,
}

impl FetchOutput {
    fn new(outcome: &FetchOutcome, cache_write_error: Option<String>) -> Self {
        let response = outcome.response();
        Self {
            source: outcome.source().to_string(),
            status: response.map(|r| r.status),
            status_text: response.map(|r| r.status_text.clone()),
            response_type: response.map(|r| r.response_type.to_string()),
            content_type: response.and_then(|r| r.content_type().map(str::to_string)),
            body: response.map(|r| String::from_utf8_lossy(&r.body).into_owned()),
            stored: matches!(outcome, FetchOutcome::Network { stored: true, .. }) && cache_write_error.is_none(),
            reason: match outcome {
                FetchOutcome::Unresolved { reason } => Some(reason.clone()),
                _ => None,
            },
            cache_write_error,
        }
    }
}

fn build_request(worker: &Worker, params: FetchParams) -> Result<Request, McpError> {
    let url = resolve(worker.scope(), &params.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;

    let method = params.method.trim().to_ascii_uppercase();
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(HostError::InvalidInput(format!("invalid method: {:?}", params.method)).into());
    }

    Ok(Request {
        method,
        url,
        headers: params.headers.into_iter().collect::<Headers>(),
        body: params.body.map(Bytes::from),
        mode: params.mode.into(),
    })
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(worker: &Worker, params: FetchParams) -> Result<CallToolResult, McpError> {
    let request = build_request(worker, params)?;

    match dispatch_and_settle(worker, Event::Fetch(request)).await? {
        (Outcome::Fetch(outcome), settle_error) => json_result(&FetchOutput::new(&outcome, settle_error)),
        (other, _) => Err(HostError::UnexpectedOutcome(format!("{other:?}")).into()),
    }
}
