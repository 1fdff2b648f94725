//! Platform surfaces backed by the MCP caller.
//!
//! There is no real notification tray or window list behind a stdio server,
//! so the host keeps them in memory. Callers describe the open windows with
//! each click and read back what the worker did to them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use url::Url;
use volta_core::Error;
use volta_worker::{Notification, Platform, WindowClient};

#[derive(Debug, Default)]
pub struct HostPlatform {
    periodic_sync: bool,
    windows: Mutex<Vec<WindowClient>>,
    displayed: Mutex<Vec<Notification>>,
    opened: AtomicUsize,
}

impl HostPlatform {
    pub fn new(periodic_sync: bool) -> Self {
        Self { periodic_sync, ..Default::default() }
    }

    /// Replace the window list the worker sees.
    pub fn set_windows(&self, windows: Vec<WindowClient>) {
        *self.windows.lock().unwrap_or_else(PoisonError::into_inner) = windows;
    }

    pub fn windows(&self) -> Vec<WindowClient> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Most recently shown notification that has not been closed.
    pub fn latest_notification(&self) -> Option<Notification> {
        self.displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn displayed(&self) -> usize {
        self.displayed.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Platform for HostPlatform {
    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, body = %notification.options.body, "show notification");
        self.displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) {
        let mut displayed = self.displayed.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(idx) = displayed.iter().rposition(|n| n == notification) {
            displayed.remove(idx);
        }
    }

    async fn match_all_windows(&self) -> Result<Vec<WindowClient>, Error> {
        Ok(self.windows())
    }

    async fn focus(&self, client: &WindowClient) -> Result<(), Error> {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if !windows.iter().any(|w| w.id == client.id) {
            return Err(Error::Platform(format!("window {} is not open", client.id)));
        }
        for window in windows.iter_mut() {
            window.focused = window.id == client.id;
        }
        tracing::info!(window = %client.id, "focus window");
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<Option<WindowClient>, Error> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        let client = WindowClient { id: format!("opened-{n}"), url: url.clone(), focused: true };

        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        for window in windows.iter_mut() {
            window.focused = false;
        }
        windows.push(client.clone());
        tracing::info!(window = %client.id, url = %url, "open window");

        Ok(Some(client))
    }

    async fn claim_clients(&self) -> Result<usize, Error> {
        Ok(self.windows.lock().unwrap_or_else(PoisonError::into_inner).len())
    }

    fn supports_periodic_sync(&self) -> bool {
        self.periodic_sync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(id: &str, url: &str) -> WindowClient {
        WindowClient { id: id.into(), url: Url::parse(url).unwrap(), focused: false }
    }

    #[tokio::test]
    async fn test_focus_moves_focus() {
        let host = HostPlatform::new(false);
        host.set_windows(vec![window("a", "https://app.example/"), window("b", "https://app.example/x")]);

        host.focus(&window("b", "https://app.example/x")).await.unwrap();
        let focused: Vec<bool> = host.windows().iter().map(|w| w.focused).collect();
        assert_eq!(focused, vec![false, true]);
    }

    #[tokio::test]
    async fn test_focus_unknown_window_fails() {
        let host = HostPlatform::new(false);
        let result = host.focus(&window("ghost", "https://app.example/")).await;
        assert!(matches!(result, Err(Error::Platform(_))));
    }

    #[tokio::test]
    async fn test_open_window_adds_focused_client() {
        let host = HostPlatform::new(false);
        host.set_windows(vec![window("a", "https://app.example/x")]);

        let opened = host.open_window(&Url::parse("https://app.example/").unwrap()).await.unwrap().unwrap();
        assert_eq!(opened.id, "opened-0");
        assert_eq!(host.claim_clients().await.unwrap(), 2);
        assert!(!host.windows()[0].focused);
    }

    #[test]
    fn test_periodic_sync_flag() {
        assert!(HostPlatform::new(true).supports_periodic_sync());
        assert!(!HostPlatform::default().supports_periodic_sync());
    }
}
