//! MCP tool implementations.
//!
//! Every `sw_*` tool turns its parameters into one worker event, dispatches
//! it, and settles the event's pending work before replying.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod notify;
pub mod sync;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use volta_core::Error;
use volta_worker::{Event, Outcome, Worker};

pub use cache::{CacheKeysParams, keys_impl};
pub use fetch::{FetchParams, fetch_impl};
pub use lifecycle::{activate_impl, install_impl};
pub use message::{MessageParams, message_impl};
pub use notify::{NotificationClickParams, PushParams, click_impl, push_impl};
pub use sync::{SyncParams, sync_impl};

/// Dispatch `event` and wait for everything it left running.
///
/// A failure in the pending work does not fail the tool; it is returned
/// alongside the outcome so the caller sees both.
pub(crate) async fn dispatch_and_settle(worker: &Worker, event: Event) -> Result<(Outcome, Option<String>), McpError> {
    let kind = event.kind();
    let dispatched = worker.dispatch(event).await?;

    let pending = dispatched.wait_until.len();
    let settle_error = dispatched.wait_until.settle().await.err().map(|e| e.to_string());
    if pending > 0 {
        tracing::debug!(event = %kind, pending, failed = settle_error.is_some(), "settled extended work");
    }

    Ok((dispatched.value, settle_error))
}

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
