//! Host surfaces the worker calls into besides the network and cache store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use volta_core::Error;

/// A button shown on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Opaque data attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch when the push arrived.
    pub date_of_arrival: i64,
    pub primary_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// A notification as displayed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

/// An open page window controlled (or controllable) by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowClient {
    pub id: String,
    pub url: Url,
    #[serde(default)]
    pub focused: bool,
}

/// Notification display and window management.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    /// Closing never fails; a notification that is already gone is fine.
    async fn close_notification(&self, notification: &Notification);

    /// All open window clients, in the platform's order.
    async fn match_all_windows(&self) -> Result<Vec<WindowClient>, Error>;

    async fn focus(&self, client: &WindowClient) -> Result<(), Error>;

    /// Open a new window. `None` when the platform opened it but cannot hand
    /// back a client (e.g. cross-origin target).
    async fn open_window(&self, url: &Url) -> Result<Option<WindowClient>, Error>;

    /// Take control of every open page; returns how many were claimed.
    async fn claim_clients(&self) -> Result<usize, Error>;

    /// Whether periodic background sync can be registered at all.
    fn supports_periodic_sync(&self) -> bool {
        false
    }
}

/// Work triggered by background sync events.
#[async_trait]
pub trait SyncTasks: Send + Sync {
    async fn sync_data(&self) -> Result<(), Error>;

    async fn update_market_data(&self) -> Result<(), Error>;
}

/// Placeholder routines that only log.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubSync;

#[async_trait]
impl SyncTasks for StubSync {
    async fn sync_data(&self) -> Result<(), Error> {
        tracing::info!("syncing data");
        Ok(())
    }

    async fn update_market_data(&self) -> Result<(), Error> {
        tracing::info!("updating market data");
        Ok(())
    }
}
