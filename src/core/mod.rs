//! Runtime core: dispatch, tracking and orchestration.
//!
//! The public API from this module is [`Coordinator`] (plus its builder) and the
//! building blocks it is made of, for callers that want to wire them by hand.
//!
//! Internal modules:
//! - [`caller`]: executes one operation with classification-driven retry and backoff;
//! - [`pool`]: bounded dispatch of operations onto the runtime;
//! - [`registry`]: lock-guarded list of in-flight tasks and the [`Drain`] capability;
//! - [`handle`]: caller-side handle to a dispatched operation;
//! - [`coordinator`]: owns pool, registry, monitor and event fan-out.

mod builder;
mod caller;
mod coordinator;
mod handle;
mod pool;
mod registry;

pub use builder::CoordinatorBuilder;
pub use caller::RetryingCaller;
pub use coordinator::Coordinator;
pub use handle::TaskHandle;
pub use pool::WorkerPool;
pub use registry::{Completion, Drain, Snapshot, TaskEntry, TaskRegistry};
