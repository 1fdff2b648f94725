//! sw_message tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use volta_worker::{Event, MessageOutcome, Outcome, Worker};

use super::{dispatch_and_settle, json_result};
use crate::error::HostError;

/// Input parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageParams {
    /// Message posted by the page, e.g. `{"type": "CACHE_NEW_ASSET", "url": "/data.json"}`.
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageOutput {
    #[serde(flatten)]
    pub outcome: MessageOutcome,
    /// Set when the asset was fetched and stored.
    pub cached: bool,
    pub error: Option<String>,
}

/// Implementation of the sw_message tool.
pub async fn message_impl(worker: &Worker, params: MessageParams) -> Result<CallToolResult, McpError> {
    match dispatch_and_settle(worker, Event::Message { data: params.data }).await? {
        (Outcome::Message(outcome), error) => {
            let cached = matches!(outcome, MessageOutcome::Caching(_)) && error.is_none();
            json_result(&MessageOutput { outcome, cached, error })
        }
        (other, _) => Err(HostError::UnexpectedOutcome(format!("{other:?}")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{fixture, output};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_cache_new_asset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/foo.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"foo\":true}"))
            .mount(&server)
            .await;
        let f = fixture(&server, &[], false).await;

        let params = MessageParams { data: json!({ "type": "CACHE_NEW_ASSET", "url": "/foo.json" }) };
        let out = output(&message_impl(&f.worker, params).await.unwrap());
        assert_eq!(out["result"], "caching");
        assert_eq!(out["url"], format!("{}/foo.json", server.uri()));
        assert_eq!(out["cached"], true);

        let entries = f.cache.entries("test-v1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(&entries[0].response.body[..], b"{\"foo\":true}");
    }

    #[tokio::test]
    async fn test_cache_new_asset_http_error_reported() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;

        let params = MessageParams { data: json!({ "type": "CACHE_NEW_ASSET", "url": "/missing.json" }) };
        let out = output(&message_impl(&f.worker, params).await.unwrap());
        assert_eq!(out["cached"], false);
        assert!(out["error"].as_str().unwrap().starts_with("HTTP_ERROR"));
    }

    #[tokio::test]
    async fn test_unknown_message_ignored() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;

        let params = MessageParams { data: json!({ "type": "SKIP_WAITING" }) };
        let out = output(&message_impl(&f.worker, params).await.unwrap());
        assert_eq!(out["result"], "ignored");
        assert_eq!(out["cached"], false);
    }
}
