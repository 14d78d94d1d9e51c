//! # Task registry - lock-guarded list of in-flight tasks.
//!
//! The registry holds one [`TaskEntry`] per dispatched task: a completion probe plus
//! the human-readable label used in timeout diagnostics.
//!
//! ## Architecture
//! ```text
//! WorkerPool::spawn ──► TaskRegistry::track(label, spawn)   (spawn + append under lock)
//!                                 │
//!                       Mutex<Vec<TaskEntry>>
//!                                 │
//! CompletionMonitor ──► Drain::prune_and_snapshot()          (prune done + count under lock)
//! ```
//!
//! ## Rules
//! - Every append, prune and snapshot happens under the same mutex.
//! - An entry is removed exactly once: at the first prune after its probe reports done.
//! - Removal is monotonic; nothing is ever re-added.
//! - The lock is never held across an `.await`.
//!
//! The monitor does not care who owns the list: anything implementing [`Drain`] works,
//! including a caller-owned `Mutex<Vec<TaskEntry>>`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::{AbortHandle, JoinHandle};

/// Something that can report whether the work it tracks has finished.
pub trait Completion: Send + Sync + 'static {
    /// True once the tracked work completed (successfully, with an error, or by panic).
    fn is_done(&self) -> bool;
}

impl Completion for AbortHandle {
    fn is_done(&self) -> bool {
        self.is_finished()
    }
}

/// One tracked task: completion probe plus diagnostic label.
pub struct TaskEntry {
    probe: Box<dyn Completion>,
    label: Arc<str>,
}

impl TaskEntry {
    /// Creates an entry from any completion probe.
    pub fn new(probe: impl Completion, label: impl Into<Arc<str>>) -> Self {
        Self {
            probe: Box::new(probe),
            label: label.into(),
        }
    }

    /// Diagnostic label of the task.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True once the task finished.
    pub fn is_done(&self) -> bool {
        self.probe.is_done()
    }
}

impl std::fmt::Debug for TaskEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEntry")
            .field("label", &self.label)
            .field("done", &self.is_done())
            .finish()
    }
}

/// Result of one prune pass: what is still outstanding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Number of entries still outstanding.
    pub remaining: usize,
    /// Labels of the outstanding entries, in registration order.
    pub labels: Vec<String>,
}

/// A lockable sequence of task entries the completion monitor can drain.
pub trait Drain: Send + Sync {
    /// Under the lock: drops every finished entry and reports what remains.
    fn prune_and_snapshot(&self) -> Snapshot;
}

impl Drain for Mutex<Vec<TaskEntry>> {
    fn prune_and_snapshot(&self) -> Snapshot {
        let mut entries = lock(self);
        entries.retain(|entry| !entry.is_done());
        Snapshot {
            remaining: entries.len(),
            labels: entries.iter().map(|e| e.label().to_string()).collect(),
        }
    }
}

impl<D: Drain + ?Sized> Drain for Arc<D> {
    fn prune_and_snapshot(&self) -> Snapshot {
        (**self).prune_and_snapshot()
    }
}

/// Thread-safe registry of in-flight tasks.
#[derive(Default)]
pub struct TaskRegistry {
    entries: Mutex<Vec<TaskEntry>>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry.
    pub fn append(&self, entry: TaskEntry) {
        lock(&self.entries).push(entry);
    }

    /// Spawns a task and registers it before the lock is released.
    ///
    /// Nobody pruning concurrently can observe the task as dispatched but unregistered.
    pub fn track<R, F>(&self, label: impl Into<Arc<str>>, spawn: F) -> JoinHandle<R>
    where
        R: Send + 'static,
        F: FnOnce() -> JoinHandle<R>,
    {
        let mut entries = lock(&self.entries);
        let join = spawn();
        entries.push(TaskEntry::new(join.abort_handle(), label));
        join
    }

    /// Number of entries currently held (finished ones included until pruned).
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// True if no entries are held.
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Labels of every held entry, without pruning.
    pub fn labels(&self) -> Vec<String> {
        lock(&self.entries)
            .iter()
            .map(|e| e.label().to_string())
            .collect()
    }
}

impl Drain for TaskRegistry {
    fn prune_and_snapshot(&self) -> Snapshot {
        self.entries.prune_and_snapshot()
    }
}

/// A panicking probe must not wedge the registry for everyone else.
fn lock(entries: &Mutex<Vec<TaskEntry>>) -> MutexGuard<'_, Vec<TaskEntry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
