//! sw_sync tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use volta_worker::{Event, EventKind, Outcome, SyncOutcome, Worker};

use super::{dispatch_and_settle, json_result};
use crate::error::HostError;

/// Input parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Sync registration tag, e.g. "sync-data".
    pub tag: String,

    /// Deliver as a periodic sync event instead of a one-off sync.
    #[serde(default)]
    pub periodic: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutput {
    pub event: EventKind,
    /// False when the worker has no handler for this event kind.
    pub handled: bool,
    #[serde(flatten)]
    pub outcome: Option<SyncOutcome>,
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl(worker: &Worker, params: SyncParams) -> Result<CallToolResult, McpError> {
    if params.tag.trim().is_empty() {
        return Err(HostError::InvalidInput("tag cannot be empty".into()).into());
    }

    let event = if params.periodic {
        Event::PeriodicSync { tag: params.tag }
    } else {
        Event::Sync { tag: params.tag }
    };
    let kind = event.kind();

    let output = match dispatch_and_settle(worker, event).await? {
        (Outcome::Sync(outcome), _) => SyncOutput { event: kind, handled: true, outcome: Some(outcome) },
        (Outcome::Unhandled(kind), _) => SyncOutput { event: kind, handled: false, outcome: None },
        (other, _) => return Err(HostError::UnexpectedOutcome(format!("{other:?}")).into()),
    };

    json_result(&output)
}
