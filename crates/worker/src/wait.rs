//! Event lifetime extension.
//!
//! Work an event handler starts but does not await (a background cache
//! write, a message-triggered fetch) is registered here. The host must
//! `settle` it before reclaiming the worker; otherwise the work may be lost.

use std::future::Future;

use tokio::task::JoinHandle;
use volta_core::Error;

/// Pending work attached to one event.
///
/// Tasks start running as soon as they are registered. Dropping a
/// `WaitUntil` detaches them; [`WaitUntil::abort`] cancels them.
#[derive(Debug, Default)]
#[must_use = "the host must settle pending work before reclaiming the worker"]
pub struct WaitUntil {
    tasks: Vec<JoinHandle<Result<(), Error>>>,
}

impl WaitUntil {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `work` on the runtime and keep the event alive until it finishes.
    pub fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.tasks.push(tokio::spawn(work));
    }

    pub fn extend(&mut self, other: WaitUntil) {
        self.tasks.extend(other.tasks);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task. All tasks are awaited even if one fails; the
    /// first failure is returned.
    pub async fn settle(self) -> Result<(), Error> {
        let mut first_err = None;

        for task in self.tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(Error::TaskFailed(join_err.to_string())),
            };

            if let Err(e) = result {
                tracing::warn!(error = %e, "extended event work failed");
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    /// Cancel everything still pending. Uncommitted work is lost.
    pub fn abort(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}

/// A handler result plus the work it left running.
#[derive(Debug)]
pub struct Extended<T> {
    pub value: T,
    pub wait_until: WaitUntil,
}

impl<T> Extended<T> {
    /// A result with nothing left running.
    pub fn now(value: T) -> Self {
        Self { value, wait_until: WaitUntil::new() }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extended<U> {
        Extended { value: f(self.value), wait_until: self.wait_until }
    }
}
