//! Push notifications and the user's response to them.

use bytes::Bytes;
use serde::Serialize;
use volta_core::Error;

use crate::platform::{Notification, NotificationAction, NotificationData, NotificationOptions};
use crate::worker::Worker;

/// What a notification click led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "client_id", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// The dismiss action was chosen.
    Dismissed,
    /// An open window at the page root was focused.
    Focused(String),
    /// No window was open at the page root, so one was opened.
    Opened(Option<String>),
}

impl Worker {
    /// Build the notification for a push and display it.
    ///
    /// The body is the payload text, or the configured default when the push
    /// carried no payload.
    pub async fn handle_push(&self, payload: Option<Bytes>) -> Result<Notification, Error> {
        let settings = &self.config.notification;
        let body = match payload {
            Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            None => settings.default_body.clone(),
        };

        let notification = Notification {
            title: settings.title.clone(),
            options: NotificationOptions {
                body,
                icon: settings.icon.clone(),
                badge: settings.badge.clone(),
                vibrate: settings.vibrate.clone(),
                data: NotificationData {
                    date_of_arrival: chrono::Utc::now().timestamp_millis(),
                    primary_key: settings.primary_key.clone(),
                },
                actions: [&settings.open_action, &settings.dismiss_action]
                    .into_iter()
                    .map(|a| NotificationAction { action: a.action.clone(), title: a.title.clone() })
                    .collect(),
            },
        };

        self.platform.show_notification(&notification).await?;
        tracing::info!(title = %notification.title, "notification shown");

        Ok(notification)
    }

    /// React to a click on a notification or one of its actions.
    ///
    /// Unless dismissed, focuses the first window at the page root or opens
    /// one. The notification is closed in every case, including failures.
    pub async fn handle_notification_click(
        &self, notification: &Notification, action: &str,
    ) -> Result<ClickOutcome, Error> {
        let outcome = if action == self.config.notification.dismiss_action.action {
            Ok(ClickOutcome::Dismissed)
        } else {
            self.focus_or_open_root().await
        };

        self.platform.close_notification(notification).await;
        outcome
    }

    async fn focus_or_open_root(&self) -> Result<ClickOutcome, Error> {
        let windows = self.platform.match_all_windows().await?;

        if let Some(client) = windows.iter().find(|client| {
            let mut url = client.url.clone();
            url.set_fragment(None);
            url == self.root
        }) {
            self.platform.focus(client).await?;
            return Ok(ClickOutcome::Focused(client.id.clone()));
        }

        let opened = self.platform.open_window(&self.root).await?;
        Ok(ClickOutcome::Opened(opened.map(|client| client.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn test_push_without_payload_uses_default_body() {
        let h = Harness::with_manifest(&[]).await;
        let notification = h.worker.handle_push(None).await.unwrap();

        assert_eq!(notification.title, "Volatility Analyzer");
        assert_eq!(notification.options.body, "New market data available");
        assert_eq!(notification.options.vibrate, vec![100, 50, 100]);
        assert_eq!(notification.options.data.primary_key, "1");
        assert_eq!(h.platform.shown.lock().unwrap().as_slice(), &[notification]);
    }

    #[tokio::test]
    async fn test_push_with_payload_uses_text() {
        let h = Harness::with_manifest(&[]).await;
        let notification = h
            .worker
            .handle_push(Some(Bytes::from_static(b"VIX crossed 30")))
            .await
            .unwrap();
        assert_eq!(notification.options.body, "VIX crossed 30");
    }

    #[tokio::test]
    async fn test_push_actions() {
        let h = Harness::with_manifest(&[]).await;
        let notification = h.worker.handle_push(None).await.unwrap();
        let actions: Vec<&str> = notification.options.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec!["explore", "close"]);
        assert_eq!(notification.options.actions[0].title, "Open Analyzer");
    }

    #[tokio::test]
    async fn test_click_dismiss_only_closes() {
        let h = Harness::with_manifest(&[]).await;
        h.platform.set_open_windows(&["https://app.example/"]);
        let notification = h.worker.handle_push(None).await.unwrap();

        let outcome = h.worker.handle_notification_click(&notification, "close").await.unwrap();
        assert_eq!(outcome, ClickOutcome::Dismissed);
        assert!(h.platform.focused.lock().unwrap().is_empty());
        assert!(h.platform.opened.lock().unwrap().is_empty());
        assert_eq!(h.platform.closed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_click_focuses_root_window() {
        let h = Harness::with_manifest(&[]).await;
        h.platform
            .set_open_windows(&["https://app.example/reports", "https://app.example/#chart", "https://app.example/"]);
        let notification = h.worker.handle_push(None).await.unwrap();

        let outcome = h.worker.handle_notification_click(&notification, "explore").await.unwrap();
        assert_eq!(outcome, ClickOutcome::Focused("window-1".into()));
        assert_eq!(h.platform.focused.lock().unwrap().as_slice(), &["window-1".to_string()]);
        assert_eq!(h.platform.closed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_click_body_opens_root_when_none_open() {
        let h = Harness::with_manifest(&[]).await;
        h.platform.set_open_windows(&["https://app.example/reports"]);
        let notification = h.worker.handle_push(None).await.unwrap();

        let outcome = h.worker.handle_notification_click(&notification, "").await.unwrap();
        assert_eq!(outcome, ClickOutcome::Opened(Some("window-new".into())));
        assert_eq!(h.platform.opened.lock().unwrap()[0].as_str(), "https://app.example/");
        assert_eq!(h.platform.closed.lock().unwrap().len(), 1);
    }
}
