//! Offline-first caching policy and event relay for one worker generation.

pub mod dispatch;
pub mod intercept;
pub mod lifecycle;
pub mod message;
pub mod notify;
pub mod platform;
pub mod sync;
pub mod wait;
pub mod worker;

#[cfg(test)]
mod testing;

pub use dispatch::{Dispatched, Event, EventKind, Outcome};
pub use intercept::FetchOutcome;
pub use lifecycle::{ActivateOutcome, InstallOutcome};
pub use message::{CACHE_NEW_ASSET, MessageOutcome};
pub use notify::ClickOutcome;
pub use platform::{
    Notification, NotificationAction, NotificationData, NotificationOptions, Platform, StubSync, SyncTasks,
    WindowClient,
};
pub use sync::SyncOutcome;
pub use wait::{Extended, WaitUntil};
pub use worker::{Worker, WorkerState};
