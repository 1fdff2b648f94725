//! Event routing.
//!
//! Handlers are registered once, when the worker is built, in an explicit
//! table keyed by event kind.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use volta_core::{Error, Request};

use crate::intercept::FetchOutcome;
use crate::lifecycle::{ActivateOutcome, InstallOutcome};
use crate::message::MessageOutcome;
use crate::notify::ClickOutcome;
use crate::platform::Notification;
use crate::sync::SyncOutcome;
use crate::wait::Extended;
use crate::worker::Worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Push,
    NotificationClick,
    Sync,
    PeriodicSync,
    Message,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Push => "push",
            EventKind::NotificationClick => "notificationclick",
            EventKind::Sync => "sync",
            EventKind::PeriodicSync => "periodicsync",
            EventKind::Message => "message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event delivered to the worker by its host.
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Push { data: Option<Bytes> },
    NotificationClick { notification: Notification, action: String },
    Sync { tag: String },
    PeriodicSync { tag: String },
    Message { data: Value },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch(_) => EventKind::Fetch,
            Event::Push { .. } => EventKind::Push,
            Event::NotificationClick { .. } => EventKind::NotificationClick,
            Event::Sync { .. } => EventKind::Sync,
            Event::PeriodicSync { .. } => EventKind::PeriodicSync,
            Event::Message { .. } => EventKind::Message,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Install(InstallOutcome),
    Activate(ActivateOutcome),
    Fetch(FetchOutcome),
    Push(Notification),
    NotificationClick(ClickOutcome),
    Sync(SyncOutcome),
    Message(MessageOutcome),
    /// No handler is registered for this kind.
    Unhandled(EventKind),
}

pub type Dispatched = Extended<Outcome>;

pub(crate) type Handler = for<'a> fn(&'a Worker, Event) -> BoxFuture<'a, Result<Dispatched, Error>>;

pub(crate) fn handler_table(periodic_sync: bool) -> HashMap<EventKind, Handler> {
    let mut handlers: HashMap<EventKind, Handler> = HashMap::new();
    handlers.insert(EventKind::Install, on_install);
    handlers.insert(EventKind::Activate, on_activate);
    handlers.insert(EventKind::Fetch, on_fetch);
    handlers.insert(EventKind::Push, on_push);
    handlers.insert(EventKind::NotificationClick, on_notification_click);
    handlers.insert(EventKind::Sync, on_sync);
    handlers.insert(EventKind::Message, on_message);
    if periodic_sync {
        handlers.insert(EventKind::PeriodicSync, on_periodic_sync);
    }
    handlers
}

fn misrouted(expected: EventKind, event: &Event) -> Error {
    Error::InvalidInput(format!("{} event routed to the {expected} handler", event.kind()))
}

fn on_install(worker: &Worker, event: Event) -> BoxFuture<'_, Result<Dispatched, Error>> {
    Box::pin(async move {
        let Event::Install = event else {
            return Err(misrouted(EventKind::Install, &event));
        };
        worker.install().await.map(|o| Dispatched::now(Outcome::Install(o)))
    })
}

fn on_activate(worker: &Worker, event: Event) -> BoxFuture<'_, Result<Dispatched, Error>> {
    Box::pin(async move {
        let Event::Activate = event else {
            return Err(misrouted(EventKind::Activate, &event));
        };
        worker.activate().await.map(|o| Dispatched::now(Outcome::Activate(o)))
    })
}

fn on_fetch(worker: &Worker, event: Event) -> BoxFuture<'_, Result<Dispatched, Error>> {
    Box::pin(async move {
        let Event::Fetch(request) = event else {
            return Err(misrouted(EventKind::Fetch, &event));
        };
        worker.handle_fetch(request).await.map(|o| o.map(Outcome::Fetch))
    })
}

fn on_push(worker: &Worker, event: Event) -> BoxFuture<'_, Result<Dispatched, Error>> {
    Box::pin(async move {
        let Event::Push { data } = event else {
            return Err(misrouted(EventKind::Push, &event));
        };
        worker.handle_push(data).await.map(|n| Dispatched::now(Outcome::Push(n)))
    })
}

fn on_notification_click(worker: &Worker, event: Event) -> BoxFuture<'_, Result<Dispatched, Error>> {
    Box::pin(async move {
        let Event::NotificationClick { notification, action } = event else {
            return Err(misrouted(EventKind::NotificationClick, &event));
        };
        worker
            .handle_notification_click(&notification, &action)
            .await
            .map(|o| Dispatched::now(Outcome::NotificationClick(o)))
    })
}

fn on_sync(worker: &Worker, event: Event) -> BoxFuture<'_, Result<Dispatched, Error>> {
    Box::pin(async move {
        let Event::Sync { tag } = event else {
            return Err(misrouted(EventKind::Sync, &event));
        };
        worker.handle_sync(&tag).await.map(|o| Dispatched::now(Outcome::Sync(o)))
    })
}

fn on_periodic_sync(worker: &Worker, event: Event) -> BoxFuture<'_, Result<Dispatched, Error>> {
    Box::pin(async move {
        let Event::PeriodicSync { tag } = event else {
            return Err(misrouted(EventKind::PeriodicSync, &event));
        };
        worker.handle_periodic_sync(&tag).await.map(|o| Dispatched::now(Outcome::Sync(o)))
    })
}

fn on_message(worker: &Worker, event: Event) -> BoxFuture<'_, Result<Dispatched, Error>> {
    Box::pin(async move {
        let Event::Message { data } = event else {
            return Err(misrouted(EventKind::Message, &event));
        };
        worker.handle_message(&data).await.map(|o| o.map(Outcome::Message))
    })
}
