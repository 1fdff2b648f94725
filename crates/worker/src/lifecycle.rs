//! Install and activation: filling the current partition and evicting old ones.

use futures_util::future::{join_all, try_join_all};
use serde::Serialize;
use url::Url;
use volta_core::{Error, Request};

use crate::worker::{Worker, WorkerState};

/// Result of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    pub version_tag: String,
    /// Manifest URLs now stored in the partition.
    pub stored: Vec<Url>,
    /// The new generation does not wait for old pages to close.
    pub skip_waiting: bool,
}

/// Result of activation.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateOutcome {
    pub version_tag: String,
    /// Partitions deleted because their name differs from the version tag.
    pub evicted: Vec<String>,
    /// Open pages now routed through this worker.
    pub claimed: usize,
}

impl Worker {
    /// Fetch every manifest entry and store the batch in the current partition.
    ///
    /// All-or-nothing: a network failure or non-2xx status for any entry fails
    /// the install and nothing is written. A first install that fails makes
    /// this generation redundant; a failed re-install of an installed worker
    /// leaves it installed. A worker that is activating or in control is not
    /// reinstalled.
    pub async fn install(&self) -> Result<InstallOutcome, Error> {
        let previous = self.state();
        if matches!(previous, WorkerState::Installing | WorkerState::Activating | WorkerState::Activated) {
            return Err(Error::InvalidInput(format!("cannot install a worker in state {previous}")));
        }

        self.set_state(WorkerState::Installing);

        match self.precache().await {
            Ok(stored) => {
                self.set_state(WorkerState::Installed);
                tracing::info!(version = %self.version_tag(), assets = stored.len(), "installed");
                Ok(InstallOutcome { version_tag: self.version_tag().to_string(), stored, skip_waiting: true })
            }
            Err(e) => {
                let fallback = match previous {
                    WorkerState::Installed => WorkerState::Installed,
                    _ => WorkerState::Redundant,
                };
                self.set_state(fallback);
                tracing::error!(version = %self.version_tag(), error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<Vec<Url>, Error> {
        let tag = self.version_tag();
        self.cache.open_partition(tag).await?;
        tracing::debug!(partition = %tag, "opened cache");

        let fetches = self.manifest.iter().map(|url| {
            let request = Request::get(url.clone());
            async move {
                let response = self
                    .network
                    .fetch(request.clone())
                    .await
                    .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;

                if !response.is_ok() {
                    return Err(Error::InstallFailed(format!("{url}: status {}", response.status)));
                }

                Ok((request, response))
            }
        });

        let pairs = try_join_all(fetches).await?;
        self.cache.put_all(tag, &pairs).await?;

        Ok(pairs.into_iter().map(|(request, _)| request.url).collect())
    }

    /// Delete every partition but the current one, then claim open pages.
    ///
    /// A partition that fails to delete is logged and left for the next
    /// activation.
    pub async fn activate(&self) -> Result<ActivateOutcome, Error> {
        let previous = self.state();
        if !matches!(previous, WorkerState::Installed | WorkerState::Activated) {
            return Err(Error::InvalidInput(format!("cannot activate a worker in state {previous}")));
        }

        self.set_state(WorkerState::Activating);

        match self.evict_and_claim().await {
            Ok(outcome) => {
                self.set_state(WorkerState::Activated);
                tracing::info!(
                    version = %outcome.version_tag,
                    evicted = outcome.evicted.len(),
                    claimed = outcome.claimed,
                    "activated"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.set_state(previous);
                Err(e)
            }
        }
    }

    async fn evict_and_claim(&self) -> Result<ActivateOutcome, Error> {
        let tag = self.version_tag();
        let stale: Vec<String> = self
            .cache
            .partition_names()
            .await?
            .into_iter()
            .filter(|name| name != tag)
            .collect();

        let deletions = stale.iter().map(|name| async move {
            tracing::info!(partition = %name, "deleting old cache");
            (name, self.cache.delete_partition(name).await)
        });

        let mut evicted = Vec::with_capacity(stale.len());
        for (name, result) in join_all(deletions).await {
            match result {
                Ok(_) => evicted.push(name.clone()),
                Err(e) => tracing::warn!(partition = %name, error = %e, "failed to delete old cache"),
            }
        }

        let claimed = self.platform.claim_clients().await?;

        Ok(ActivateOutcome { version_tag: tag.to_string(), evicted, claimed })
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{Harness, ResponseExt, get, ok_html};
    use crate::worker::WorkerState;
    use volta_core::{Error, Request};

    #[tokio::test]
    async fn test_install_stores_every_manifest_entry() {
        let h = Harness::with_manifest(&["./", "./index.html", "https://cdn.example/chart.js"]).await;
        h.network.serve_all_manifest(&h.worker);

        let outcome = h.worker.install().await.unwrap();
        assert!(outcome.skip_waiting);
        assert_eq!(outcome.stored.len(), 3);
        assert_eq!(h.worker.state(), WorkerState::Installed);

        for url in h.worker.manifest() {
            let hit = h.cache.match_request("v3", &Request::get(url.clone())).await.unwrap();
            assert!(hit.is_some(), "{url} missing after install");
        }
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let h = Harness::with_manifest(&["./", "./index.html", "./missing.js"]).await;
        h.network.serve("https://app.example/", ok_html("root"));
        h.network.serve("https://app.example/index.html", ok_html("index"));
        h.network.fail("https://app.example/missing.js");

        let result = h.worker.install().await;
        assert!(matches!(result, Err(Error::InstallFailed(_))));
        assert_eq!(h.worker.state(), WorkerState::Redundant);
        assert!(h.cache.entries("v3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_rejects_non_2xx() {
        let h = Harness::with_manifest(&["./", "./index.html"]).await;
        h.network.serve("https://app.example/", ok_html("root"));
        h.network.serve("https://app.example/index.html", ok_html("gone").with_status(404));

        assert!(matches!(h.worker.install().await, Err(Error::InstallFailed(msg)) if msg.contains("404")));
        assert!(h.cache.entries("v3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_install_keeps_previous_generation() {
        let h = Harness::with_manifest(&["./"]).await;
        h.cache
            .put("v2", &Request::get(h.worker.root().clone()), &ok_html("old root"))
            .await
            .unwrap();
        h.network.fail("https://app.example/");

        assert!(h.worker.install().await.is_err());
        assert!(h.cache.has_partition("v2").await.unwrap());
        assert!(h.worker.activate().await.is_err());
    }

    #[tokio::test]
    async fn test_reinstall_of_active_worker_rejected() {
        let h = Harness::activated(&["./", "./index.html"]).await;
        h.network.fail("https://app.example/index.html");

        assert!(matches!(h.worker.install().await, Err(Error::InvalidInput(_))));
        assert_eq!(h.worker.state(), WorkerState::Activated);
        assert_eq!(h.network.call_count(), 2);

        let hit = h.cache.match_request("v3", &get("https://app.example/index.html")).await.unwrap();
        assert!(hit.is_some());
        assert!(h.worker.activate().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_reinstall_keeps_installed() {
        let h = Harness::with_manifest(&["./", "./index.html"]).await;
        h.network.serve_all_manifest(&h.worker);
        h.worker.install().await.unwrap();

        h.network.fail("https://app.example/index.html");
        assert!(matches!(h.worker.install().await, Err(Error::InstallFailed(_))));
        assert_eq!(h.worker.state(), WorkerState::Installed);
        assert_eq!(h.cache.entries("v3").await.unwrap().len(), 2);
        assert!(h.worker.activate().await.is_ok());
    }

    #[tokio::test]
    async fn test_activate_evicts_other_partitions() {
        let h = Harness::with_manifest(&["./"]).await;
        h.network.serve_all_manifest(&h.worker);
        h.cache.open_partition("v1").await.unwrap();
        h.cache.open_partition("v2").await.unwrap();
        h.cache.open_partition("unrelated").await.unwrap();

        h.worker.install().await.unwrap();
        let outcome = h.worker.activate().await.unwrap();

        assert_eq!(outcome.evicted, vec!["v1", "v2", "unrelated"]);
        assert_eq!(h.cache.partition_names().await.unwrap(), vec!["v3"]);
        assert_eq!(h.worker.state(), WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_activate_claims_clients() {
        let h = Harness::with_manifest(&["./"]).await;
        h.network.serve_all_manifest(&h.worker);
        h.platform.set_open_windows(&["https://app.example/", "https://app.example/index.html"]);

        h.worker.install().await.unwrap();
        let outcome = h.worker.activate().await.unwrap();
        assert_eq!(outcome.claimed, 2);
    }

    #[tokio::test]
    async fn test_activate_is_repeatable() {
        let h = Harness::with_manifest(&["./"]).await;
        h.network.serve_all_manifest(&h.worker);
        h.worker.install().await.unwrap();
        h.worker.activate().await.unwrap();

        h.cache.open_partition("v2").await.unwrap();
        let outcome = h.worker.activate().await.unwrap();
        assert_eq!(outcome.evicted, vec!["v2"]);
    }

    #[tokio::test]
    async fn test_activate_before_install_rejected() {
        let h = Harness::with_manifest(&["./"]).await;
        assert!(matches!(h.worker.activate().await, Err(Error::InvalidInput(_))));
        assert_eq!(h.worker.state(), WorkerState::Parsed);
    }
}
