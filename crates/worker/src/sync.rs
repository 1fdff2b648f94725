//! Background sync and periodic sync relays.

use serde::Serialize;
use volta_core::Error;

use crate::worker::Worker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "tag", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The tag matched and its routine finished.
    Completed(String),
    /// Unknown tag; nothing ran.
    Ignored(String),
}

impl Worker {
    /// One-off background sync. Runs the data sync routine for the data tag.
    pub async fn handle_sync(&self, tag: &str) -> Result<SyncOutcome, Error> {
        if tag != self.config.sync.data_tag {
            tracing::debug!(tag, "ignoring sync tag");
            return Ok(SyncOutcome::Ignored(tag.to_string()));
        }

        self.sync.sync_data().await?;
        Ok(SyncOutcome::Completed(tag.to_string()))
    }

    /// Periodic sync. Runs the market data update for the periodic tag.
    pub async fn handle_periodic_sync(&self, tag: &str) -> Result<SyncOutcome, Error> {
        if tag != self.config.sync.periodic_tag {
            tracing::debug!(tag, "ignoring periodic sync tag");
            return Ok(SyncOutcome::Ignored(tag.to_string()));
        }

        self.sync.update_market_data().await?;
        Ok(SyncOutcome::Completed(tag.to_string()))
    }
}
