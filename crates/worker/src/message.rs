//! Messages posted by the hosting page.
//!
//! The only recognized message is `{ "type": "CACHE_NEW_ASSET", "url": "..." }`,
//! which adds one URL to the current partition without a new version tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use volta_client::resolve;
use volta_core::{Error, Request};

use crate::wait::{Extended, WaitUntil};
use crate::worker::Worker;

pub const CACHE_NEW_ASSET: &str = "CACHE_NEW_ASSET";

#[derive(Debug, Deserialize)]
struct PageMessage {
    #[serde(rename = "type")]
    kind: String,
    url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "url", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// Fetch-and-store of this URL is running in the event's `wait_until`.
    Caching(Url),
    Ignored,
}

impl Worker {
    /// Handle a page message. Unrecognized or malformed messages are ignored.
    pub async fn handle_message(&self, data: &Value) -> Result<Extended<MessageOutcome>, Error> {
        let message = match PageMessage::deserialize(data) {
            Ok(message) if message.kind == CACHE_NEW_ASSET => message,
            _ => {
                tracing::debug!("ignoring page message");
                return Ok(Extended::now(MessageOutcome::Ignored));
            }
        };

        let Some(raw_url) = message.url else {
            tracing::debug!("{CACHE_NEW_ASSET} without url");
            return Ok(Extended::now(MessageOutcome::Ignored));
        };

        let url = resolve(&self.scope, &raw_url).map_err(|e| Error::InvalidUrl(format!("{raw_url}: {e}")))?;
        let request = Request::get(url.clone());
        let network = self.network.clone();
        let cache = self.cache.clone();
        let partition = self.version_tag().to_string();

        let mut wait_until = WaitUntil::new();
        wait_until.spawn(async move {
            let response = network.fetch(request.clone()).await?;
            if !response.is_ok() {
                return Err(Error::HttpError(format!("{}: status {}", request.url, response.status)));
            }
            cache.put(&partition, &request, &response).await?;
            tracing::info!(url = %request.url, partition = %partition, "cached new asset");
            Ok(())
        });

        Ok(Extended { value: MessageOutcome::Caching(url), wait_until })
    }
}
