//! MCP server handler implementation.
//!
//! Each tool delivers one event to the worker, so an embedding process can
//! drive install, activation and runtime events over stdio.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use volta_worker::Worker;

use crate::host::HostPlatform;
use crate::tools::{
    CacheKeysParams, FetchParams, MessageParams, NotificationClickParams, PushParams, SyncParams, activate_impl,
    click_impl, fetch_impl, install_impl, keys_impl, message_impl, push_impl, sync_impl,
};

#[derive(Clone)]
pub struct VoltaServer {
    worker: Arc<Worker>,
    host: Arc<HostPlatform>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl VoltaServer {
    pub fn new(worker: Arc<Worker>, host: Arc<HostPlatform>) -> Self {
        Self { worker, host, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install the current version: fetch every manifest asset and store them in its cache partition. \
        Fails without writing anything if any asset fails.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate the installed version: delete every other cache partition and claim open windows.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    #[tool(description = "Send a page request through the worker. Returns whether it was answered from cache, \
        network, the offline document, or not at all.")]
    async fn sw_fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message. Returns the notification that was shown.")]
    async fn sw_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Click the most recent notification or one of its actions. Optionally sets the open \
        windows first; returns what was focused or opened.")]
    async fn sw_notification_click(
        &self, params: Parameters<NotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        click_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Fire a background sync (or periodic sync) event with the given tag.")]
    async fn sw_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Post a message from the page, e.g. {\"type\": \"CACHE_NEW_ASSET\", \"url\": \"/data.json\"}.")]
    async fn sw_message(&self, params: Parameters<MessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache partitions and the requests stored in each.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(self.worker.cache(), self.worker.version_tag(), params.0).await
    }
}

impl ServerHandler for VoltaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "volta-worker".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
