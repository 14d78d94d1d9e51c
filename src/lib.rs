//! # drainvisor
//!
//! **Drainvisor** runs many concurrent calls against a quota-limited, occasionally
//! unreliable remote API and tells you when the whole batch has finished.
//!
//! It provides a bounded worker pool whose calls retry transient failures with
//! exponential backoff, a thread-safe registry of in-flight calls, and a completion
//! monitor that only reports "drained" after the registry has stayed empty for a full
//! stability window.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     submit("read_cell", args)   submit("append_row", args)   spawn(label, op)
//!            │                           │                          │
//!            ▼                           ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Coordinator                                                      │
//! │  - Catalog (name → operation)                                     │
//! │  - WorkerPool (semaphore: max_workers permits)                    │
//! │  - TaskRegistry (Mutex<Vec<TaskEntry>>)                           │
//! │  - CompletionMonitor (rolling window, timeout, grace, escalation) │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │RetryingCaller│   │RetryingCaller│   │RetryingCaller│   │
//!     │ (per worker) │   │ (per worker) │   │ (per worker) │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ CallStarting     │ BackoffSched.    │ CallFailed      │ DrainProgress
//!      │ CallSucceeded    │                  │                 │ DrainStable / TimedOut
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Bus (broadcast channel)                       │
//! │                  (capacity: Config::bus_capacity)                 │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       │   (in Coordinator)     │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//! ```
//!
//! ### Drain detection
//! ```text
//! every poll_interval:
//!   ├─► registry.prune_and_snapshot()         (under the registry lock)
//!   ├─► elapsed >= timeout ─► grace period ─► report ─► DrainTimeout / Escalated
//!   ├─► window.push(remaining)
//!   └─► window full and all zero ─► Ok(Drained)
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                         |
//! |-------------------|-----------------------------------------------------------------|--------------------------------------------|
//! | **Operations**    | Deferred, re-issuable remote calls resolved by name.            | [`Operation`], [`OpFn`], [`Catalog`]       |
//! | **Retry**         | Error classification and exponential backoff with jitter.       | [`Classify`], [`BackoffPolicy`]            |
//! | **Dispatch**      | Bounded concurrency with registration before `submit` returns.  | [`WorkerPool`], [`TaskHandle`]             |
//! | **Drain**         | Stable-empty detection with timeout, grace and escalation.      | [`CompletionMonitor`], [`Escalate`]        |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, audit).             | [`Subscribe`]                              |
//! | **Errors**        | Typed errors for calls, submission, tasks and drains.           | [`CallError`], [`TaskError`], [`MonitorError`] |
//! | **Configuration** | Centralize runtime settings.                                    | [`Config`], [`MonitorConfig`]              |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use drainvisor::{CallError, Config, Coordinator, OpFn, OperationTable};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.monitor.stability_window = 3;
//!     cfg.monitor.poll_interval = Duration::from_millis(5);
//!
//!     let catalog: OperationTable<String, usize, CallError> = OperationTable::new()
//!         .register("read_cell", |cell: String| {
//!             OpFn::arc(move || {
//!                 let cell = cell.clone();
//!                 async move { Ok::<_, CallError>(cell.len()) }
//!             })
//!         });
//!
//!     let coord = Coordinator::builder(cfg, catalog).build();
//!     let handles: Vec<_> = ["A1", "B2", "C3"]
//!         .into_iter()
//!         .map(|cell| coord.submit("read_cell", cell.to_string()))
//!         .collect::<Result<_, _>>()?;
//!
//!     coord.await_drain("sheet").await?;
//!     for h in handles {
//!         assert_eq!(h.join().await?, 2);
//!     }
//!     coord.shutdown().await;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod monitor;
mod operations;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{
    Completion, Coordinator, CoordinatorBuilder, Drain, RetryingCaller, Snapshot, TaskEntry,
    TaskHandle, TaskRegistry, WorkerPool,
};
pub use error::{CallError, MonitorError, PoolError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use monitor::{
    CompletionMonitor, DrainReport, Drained, Escalate, EscalationOutcome, MonitorConfig,
    RollingWindow, StatusSink, TracingSink,
};
pub use operations::{BoxCallFuture, Catalog, OpFn, Operation, OperationRef, OperationTable};
pub use policies::{BackoffPolicy, Classify, ErrorClass, JitterPolicy};
pub use subscribers::{Subscribe, SubscriberSet};
