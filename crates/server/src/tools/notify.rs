//! sw_push and sw_notification_click tool implementations.

use bytes::Bytes;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;
use volta_core::Error;
use volta_worker::{ClickOutcome, Event, Outcome, WindowClient, Worker};

use super::{dispatch_and_settle, json_result};
use crate::error::HostError;
use crate::host::HostPlatform;

/// Input parameters for the sw_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Push payload text. Omit to simulate a push without payload.
    #[serde(default)]
    pub data: Option<String>,
}

/// An open page window as seen by the host.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WindowParam {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub focused: bool,
}

/// Input parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Action button id; empty for a click on the notification body.
    #[serde(default)]
    pub action: String,

    /// Windows currently open. Omit to keep the host's current list.
    #[serde(default)]
    pub windows: Option<Vec<WindowParam>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationClickOutput {
    #[serde(flatten)]
    pub outcome: ClickOutcome,
    /// Window list after the click.
    pub windows: Vec<WindowClient>,
    /// Notifications still displayed.
    pub displayed: usize,
}

/// Implementation of the sw_push tool.
pub async fn push_impl(worker: &Worker, params: PushParams) -> Result<CallToolResult, McpError> {
    let event = Event::Push { data: params.data.map(Bytes::from) };

    match dispatch_and_settle(worker, event).await? {
        (Outcome::Push(notification), _) => json_result(&notification),
        (other, _) => Err(HostError::UnexpectedOutcome(format!("{other:?}")).into()),
    }
}

/// Implementation of the sw_notification_click tool.
///
/// Clicks the most recently shown notification that is still displayed.
pub async fn click_impl(
    worker: &Worker, host: &HostPlatform, params: NotificationClickParams,
) -> Result<CallToolResult, McpError> {
    if let Some(windows) = params.windows {
        let windows = windows
            .into_iter()
            .map(|w| {
                let url = Url::parse(&w.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", w.url)))?;
                Ok(WindowClient { id: w.id, url, focused: w.focused })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        host.set_windows(windows);
    }

    let notification = host.latest_notification().ok_or(HostError::NoNotification)?;
    let event = Event::NotificationClick { notification, action: params.action };

    match dispatch_and_settle(worker, event).await? {
        (Outcome::NotificationClick(outcome), _) => {
            json_result(&NotificationClickOutput { outcome, windows: host.windows(), displayed: host.displayed() })
        }
        (other, _) => Err(HostError::UnexpectedOutcome(format!("{other:?}")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{fixture, output};
    use wiremock::MockServer;

    fn window(id: &str, url: &str) -> WindowParam {
        WindowParam { id: id.into(), url: url.into(), focused: false }
    }

    #[tokio::test]
    async fn test_push_default_body() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;

        let out = output(&push_impl(&f.worker, PushParams::default()).await.unwrap());
        assert_eq!(out["title"], "Volatility Analyzer");
        assert_eq!(out["options"]["body"], "New market data available");
        assert_eq!(out["options"]["actions"][0]["action"], "explore");
        assert_eq!(f.host.displayed(), 1);
    }

    #[tokio::test]
    async fn test_push_payload_body() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;

        let params = PushParams { data: Some("VIX above 25".into()) };
        let out = output(&push_impl(&f.worker, params).await.unwrap());
        assert_eq!(out["options"]["body"], "VIX above 25");
    }

    #[tokio::test]
    async fn test_click_without_notification() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;

        let err = click_impl(&f.worker, &f.host, NotificationClickParams::default()).await.unwrap_err();
        assert_eq!(err.code.0, -32010);
    }

    #[tokio::test]
    async fn test_click_focuses_open_root() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;
        push_impl(&f.worker, PushParams::default()).await.unwrap();

        let root = format!("{}/", server.uri());
        let params = NotificationClickParams {
            action: "explore".into(),
            windows: Some(vec![window("a", &format!("{root}settings")), window("b", &root)]),
        };
        let out = output(&click_impl(&f.worker, &f.host, params).await.unwrap());
        assert_eq!(out["result"], "focused");
        assert_eq!(out["client_id"], "b");
        assert_eq!(out["windows"][1]["focused"], true);
        assert_eq!(out["displayed"], 0);
    }

    #[tokio::test]
    async fn test_click_opens_root_when_absent() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;
        push_impl(&f.worker, PushParams::default()).await.unwrap();

        let out = output(&click_impl(&f.worker, &f.host, NotificationClickParams::default()).await.unwrap());
        assert_eq!(out["result"], "opened");
        assert_eq!(out["client_id"], "opened-0");
        assert_eq!(out["windows"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_click_dismiss() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;
        push_impl(&f.worker, PushParams::default()).await.unwrap();

        let params = NotificationClickParams { action: "close".into(), windows: None };
        let out = output(&click_impl(&f.worker, &f.host, params).await.unwrap());
        assert_eq!(out["result"], "dismissed");
        assert!(f.host.windows().is_empty());
        assert_eq!(out["displayed"], 0);
    }
}
