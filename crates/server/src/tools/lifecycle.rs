//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use volta_worker::{Event, Outcome, Worker};

use super::{dispatch_and_settle, json_result};
use crate::error::HostError;

/// Run install: pre-cache the manifest into the current partition.
pub async fn install_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    match dispatch_and_settle(worker, Event::Install).await? {
        (Outcome::Install(outcome), _) => json_result(&outcome),
        (other, _) => Err(HostError::UnexpectedOutcome(format!("{other:?}")).into()),
    }
}

/// Run activation: evict stale partitions and claim open windows.
pub async fn activate_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    match dispatch_and_settle(worker, Event::Activate).await? {
        (Outcome::Activate(outcome), _) => json_result(&outcome),
        (other, _) => Err(HostError::UnexpectedOutcome(format!("{other:?}")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{fixture, output};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve_site(server: &MockServer) {
        for p in ["/", "/index.html", "/app.js"] {
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!("asset {p}")))
                .mount(server)
                .await;
        }
    }

    #[tokio::test]
    async fn test_install_then_activate() {
        let server = MockServer::start().await;
        serve_site(&server).await;
        let f = fixture(&server, &["./", "./index.html", "./app.js"], false).await;
        f.cache.open_partition("test-v0").await.unwrap();

        let installed = output(&install_impl(&f.worker).await.unwrap());
        assert_eq!(installed["version_tag"], "test-v1");
        assert_eq!(installed["stored"].as_array().unwrap().len(), 3);
        assert_eq!(installed["skip_waiting"], true);

        let activated = output(&activate_impl(&f.worker).await.unwrap());
        assert_eq!(activated["evicted"], serde_json::json!(["test-v0"]));
        assert_eq!(f.cache.partition_names().await.unwrap(), vec!["test-v1"]);
    }

    #[tokio::test]
    async fn test_install_failure_is_tool_error() {
        let server = MockServer::start().await;
        serve_site(&server).await;
        let f = fixture(&server, &["./", "./missing.css"], false).await;

        let err = install_impl(&f.worker).await.unwrap_err();
        assert_eq!(err.code.0, -32007);
        assert!(f.cache.entries("test-v1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reinstall_after_activate_rejected() {
        let server = MockServer::start().await;
        serve_site(&server).await;
        let f = fixture(&server, &["./", "./index.html"], false).await;
        install_impl(&f.worker).await.unwrap();
        activate_impl(&f.worker).await.unwrap();

        let err = install_impl(&f.worker).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert_eq!(f.worker.state(), volta_worker::WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_activate_before_install_rejected() {
        let server = MockServer::start().await;
        let f = fixture(&server, &[], false).await;
        assert!(activate_impl(&f.worker).await.is_err());
    }
}
