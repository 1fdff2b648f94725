//! Fetch interception: cache first, then network, then the offline document.

use volta_client::is_streaming;
use volta_core::{Error, Request, Response};

use crate::wait::{Extended, WaitUntil};
use crate::worker::Worker;

/// What the worker answered for one page request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted; the page talks to the network directly.
    Passthrough,
    /// Served from the current partition without touching the network.
    Cache(Response),
    /// Fetched from the network. `stored` is true when a copy is being
    /// written to the current partition.
    Network { response: Response, stored: bool },
    /// Network failed; the cached offline document stands in for an HTML request.
    Fallback(Response),
    /// Network failed and nothing can stand in. The page sees a failed fetch.
    Unresolved { reason: String },
}

impl FetchOutcome {
    /// The response handed back to the page, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Cache(response)
            | FetchOutcome::Network { response, .. }
            | FetchOutcome::Fallback(response) => Some(response),
            FetchOutcome::Passthrough | FetchOutcome::Unresolved { .. } => None,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            FetchOutcome::Passthrough => "passthrough",
            FetchOutcome::Cache(_) => "cache",
            FetchOutcome::Network { .. } => "network",
            FetchOutcome::Fallback(_) => "fallback",
            FetchOutcome::Unresolved { .. } => "unresolved",
        }
    }
}

impl Worker {
    /// Answer a page request.
    ///
    /// The network response is returned without waiting for the cache write;
    /// that write is in the returned `wait_until`.
    pub async fn handle_fetch(&self, request: Request) -> Result<Extended<FetchOutcome>, Error> {
        if is_streaming(&request.url) {
            return Ok(Extended::now(FetchOutcome::Passthrough));
        }

        if !self.state().can_intercept_fetch() {
            tracing::debug!(url = %request.url, state = %self.state(), "worker not in control, passing through");
            return Ok(Extended::now(FetchOutcome::Passthrough));
        }

        let tag = self.version_tag();

        if let Some(response) = self.cache.match_request(tag, &request).await? {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(Extended::now(FetchOutcome::Cache(response)));
        }

        match self.network.fetch(request.clone()).await {
            Ok(response) if response.is_cacheable() && request.is_get() => {
                let copy = response.clone();
                let cache = self.cache.clone();
                let partition = tag.to_string();

                let mut wait_until = WaitUntil::new();
                wait_until.spawn(async move { cache.put(&partition, &request, &copy).await });

                Ok(Extended { value: FetchOutcome::Network { response, stored: true }, wait_until })
            }
            Ok(response) => {
                tracing::debug!(
                    url = %request.url,
                    status = response.status,
                    response_type = %response.response_type,
                    "not caching response"
                );
                Ok(Extended::now(FetchOutcome::Network { response, stored: false }))
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "network request failed");
                self.offline_fallback(&request, &e).await.map(Extended::now)
            }
        }
    }

    async fn offline_fallback(&self, request: &Request, cause: &Error) -> Result<FetchOutcome, Error> {
        if !request.accepts_html() {
            return Ok(FetchOutcome::Unresolved { reason: cause.to_string() });
        }

        match self.cache.match_url(self.version_tag(), &self.offline_document).await? {
            Some(document) => Ok(FetchOutcome::Fallback(document)),
            None => Ok(FetchOutcome::Unresolved { reason: format!("{cause}; no offline document cached") }),
        }
    }
}
