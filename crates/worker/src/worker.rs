//! The worker: immutable settings, collaborators and the handler table.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use url::Url;
use volta_client::{Network, resolve};
use volta_core::{CacheDb, Error, WorkerConfig};

use crate::dispatch::{Dispatched, Event, EventKind, Handler, Outcome, handler_table};
use crate::platform::{Platform, StubSync, SyncTasks};

/// Lifecycle of one worker generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, install not yet run.
    Parsed,
    Installing,
    /// Install succeeded; eligible for activation without waiting.
    Installed,
    Activating,
    /// Controls pages and intercepts their requests.
    Activated,
    /// Install failed; the previous generation stays in control.
    Redundant,
}

impl WorkerState {
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// One worker generation, identified by its version tag.
pub struct Worker {
    pub(crate) config: Arc<WorkerConfig>,
    pub(crate) scope: Url,
    pub(crate) manifest: Vec<Url>,
    pub(crate) root: Url,
    pub(crate) offline_document: Url,
    pub(crate) cache: CacheDb,
    pub(crate) network: Arc<dyn Network>,
    pub(crate) platform: Arc<dyn Platform>,
    pub(crate) sync: Arc<dyn SyncTasks>,
    state: Mutex<WorkerState>,
    handlers: HashMap<EventKind, Handler>,
}

impl Worker {
    /// Build a worker from validated settings.
    ///
    /// Manifest entries, the page root and the offline document are resolved
    /// against the scope once, here. The periodic sync handler is registered
    /// only if the platform supports periodic scheduling.
    pub fn new(
        config: Arc<WorkerConfig>, cache: CacheDb, network: Arc<dyn Network>, platform: Arc<dyn Platform>,
    ) -> Result<Self, Error> {
        let scope = config.scope_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let resolve_in_scope =
            |input: &str| resolve(&scope, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")));

        let manifest = config
            .manifest
            .iter()
            .map(|entry| resolve_in_scope(entry))
            .collect::<Result<Vec<_>, _>>()?;
        let root = resolve_in_scope(&config.root)?;
        let offline_document = resolve_in_scope(&config.offline_document)?;

        let handlers = handler_table(platform.supports_periodic_sync());

        Ok(Self {
            config,
            scope,
            manifest,
            root,
            offline_document,
            cache,
            network,
            platform,
            sync: Arc::new(StubSync),
            state: Mutex::new(WorkerState::Parsed),
            handlers,
        })
    }

    /// Replace the stub sync routines.
    pub fn with_sync_tasks(mut self, sync: Arc<dyn SyncTasks>) -> Self {
        self.sync = sync;
        self
    }

    /// Route an event to its registered handler.
    ///
    /// Events with no registered handler resolve to [`Outcome::Unhandled`].
    /// The returned `wait_until` must be settled before the worker is dropped.
    pub async fn dispatch(&self, event: Event) -> Result<Dispatched, Error> {
        let kind = event.kind();
        let Some(handler) = self.handlers.get(&kind).copied() else {
            tracing::debug!(event = %kind, "no handler registered");
            return Ok(Dispatched::now(Outcome::Unhandled(kind)));
        };

        tracing::debug!(event = %kind, "dispatching");
        handler(self, event).await
    }

    /// Event kinds this worker has handlers for.
    pub fn registered_events(&self) -> Vec<EventKind> {
        let mut kinds: Vec<EventKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn version_tag(&self) -> &str {
        &self.config.version_tag
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Resolved manifest URLs, in configuration order.
    pub fn manifest(&self) -> &[Url] {
        &self.manifest
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn offline_document(&self) -> &Url {
        &self.offline_document
    }

    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_state(&self, next: WorkerState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            tracing::debug!(version = %self.config.version_tag, from = %*state, to = %next, "worker state");
            *state = next;
        }
    }
}
