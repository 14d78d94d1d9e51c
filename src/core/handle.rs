//! # Caller-side handle to a dispatched operation.
//!
//! The pool returns a [`TaskHandle`] from every submission. The registry tracks the
//! same task through its own probe, so the caller may drop the handle, poll
//! [`TaskHandle::is_done`], or [`join`](TaskHandle::join) it for the result without
//! affecting drain detection.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::TaskError;
use crate::subscribers::panic_message;

/// Future-like reference to an operation's eventual outcome.
pub struct TaskHandle<T, E> {
    label: Arc<str>,
    join: JoinHandle<Result<T, TaskError<E>>>,
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(label: Arc<str>, join: JoinHandle<Result<T, TaskError<E>>>) -> Self {
        Self { label, join }
    }

    /// Label the task was registered under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True once the operation finished (with any outcome).
    pub fn is_done(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the operation and returns its result.
    ///
    /// Fatal operation errors surface as [`TaskError::Failed`]; a panic on the worker
    /// surfaces as [`TaskError::Panicked`].
    pub async fn join(self) -> Result<T, TaskError<E>> {
        match self.join.await {
            Ok(res) => res,
            Err(err) if err.is_panic() => Err(TaskError::Panicked {
                reason: panic_message(err.into_panic().as_ref()),
            }),
            Err(_) => Err(TaskError::Aborted),
        }
    }
}

impl<T, E> std::fmt::Debug for TaskHandle<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("label", &self.label)
            .field("done", &self.is_done())
            .finish()
    }
}
