//! volta-mcp entry point.
//!
//! Boots one worker generation and serves its events as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use volta_client::{FetchClient, FetchConfig};
use volta_core::{AppConfig, CacheDb};
use volta_worker::Worker;

mod error;
mod handler;
mod host;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let scope = config.worker.scope_url()?;

    tracing::info!(
        version = %config.worker.version_tag,
        scope = %scope,
        db = %config.db_path.display(),
        "Starting volta-mcp on stdio transport"
    );

    let cache = CacheDb::open(&config.db_path).await?;

    let mut fetch = FetchConfig::new(scope);
    fetch.user_agent = config.user_agent.clone();
    fetch.max_bytes = config.max_bytes;
    fetch.timeout = config.timeout();
    let network = FetchClient::new(fetch)?;

    let host = Arc::new(host::HostPlatform::new(config.periodic_sync));
    let worker = Worker::new(Arc::new(config.worker), cache, Arc::new(network), host.clone())?;
    tracing::debug!(events = ?worker.registered_events(), "handlers registered");

    let handler = handler::VoltaServer::new(Arc::new(worker), host);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
