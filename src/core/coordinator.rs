//! # Coordinator: one batch of remote calls, from submission to drain.
//!
//! The [`Coordinator`] owns the event bus, the [`SubscriberSet`] listener, a
//! [`WorkerPool`] with its [`TaskRegistry`], and a [`CompletionMonitor`]. It is the
//! explicit replacement for a host object that exposes "a futures list and a lock".
//!
//! ## Architecture
//! ```text
//! Coordinator::submit(name, args)
//!     └─► WorkerPool::submit(&catalog, ..) ──► TaskRegistry (entry appended)
//!                                                   ▲
//! Coordinator::await_drain(label)                   │ prune_and_snapshot()
//!     └─► CompletionMonitor::await_drain ───────────┘
//!
//! Event flow:
//!   RetryingCaller / WorkerPool / CompletionMonitor ── publish ──► Bus
//!        ──► listener ──► SubscriberSet::emit ──► [queue S1] ... [queue SN]
//!
//! Shutdown:
//!   shutdown() ─► pool.close()           (queued work fails with PoolClosed)
//!              ─► token.cancel()         (listener flushes what is buffered)
//!              ─► SubscriberSet::shutdown (workers finish their queues)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use drainvisor::{CallError, Config, Coordinator, OpFn, OperationTable};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.monitor.stability_window = 2;
//!     cfg.monitor.poll_interval = Duration::from_millis(10);
//!
//!     let catalog: OperationTable<u32, u32, CallError> = OperationTable::new()
//!         .register("double", |n: u32| OpFn::arc(move || async move { Ok::<_, CallError>(n * 2) }));
//!
//!     let coord = Coordinator::builder(cfg, catalog).build();
//!     let handle = coord.submit("double", 21)?;
//!
//!     coord.await_drain("example").await?;
//!     assert_eq!(handle.join().await?, 42);
//!
//!     coord.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{
    builder::CoordinatorBuilder, handle::TaskHandle, pool::WorkerPool, registry::TaskRegistry,
};
use crate::{
    config::Config,
    error::{MonitorError, PoolError},
    events::Bus,
    monitor::{CompletionMonitor, Drained},
    operations::{Catalog, OperationRef},
    policies::Classify,
    subscribers::SubscriberSet,
};

/// Submits named operations and waits for the batch to drain.
pub struct Coordinator<C: Catalog> {
    cfg: Config,
    catalog: C,
    pool: WorkerPool,
    monitor: CompletionMonitor,
    bus: Bus,
    token: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Catalog> Coordinator<C> {
    /// Starts building a coordinator over `catalog`.
    pub fn builder(cfg: Config, catalog: C) -> CoordinatorBuilder<C> {
        CoordinatorBuilder::new(cfg, catalog)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        catalog: C,
        pool: WorkerPool,
        monitor: CompletionMonitor,
        bus: Bus,
        token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            catalog,
            pool,
            monitor,
            bus,
            token,
            listener: Mutex::new(None),
        }
    }

    /// Resolves `name` in the catalog and dispatches it; returns without waiting.
    pub fn submit(
        &self,
        name: &str,
        args: C::Args,
    ) -> Result<TaskHandle<C::Output, C::Error>, PoolError> {
        self.pool.submit(&self.catalog, name, args)
    }

    /// Dispatches an operation that is not part of the catalog.
    pub fn spawn<T, E>(
        &self,
        label: impl Into<Arc<str>>,
        op: OperationRef<T, E>,
    ) -> Result<TaskHandle<T, E>, PoolError>
    where
        T: Send + 'static,
        E: Classify + fmt::Display + Send + 'static,
    {
        self.pool.spawn(label, op)
    }

    /// Waits until every submitted operation finished and the registry stayed empty
    /// for a full stability window.
    pub async fn await_drain(&self, label: &str) -> Result<Drained, MonitorError> {
        self.monitor.await_drain(self.pool.registry(), label).await
    }

    /// Closes the pool and stops event fan-out after flushing buffered events.
    ///
    /// Running operations are not cancelled. Idempotent.
    pub async fn shutdown(&self) {
        self.pool.close();
        self.token.cancel();
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            let _ = listener.await;
        }
        debug!("coordinator shut down");
    }

    /// Configuration the coordinator was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Operation catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Worker pool.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Registry of in-flight tasks.
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        self.pool.registry()
    }

    /// Completion monitor.
    pub fn monitor(&self) -> &CompletionMonitor {
        &self.monitor
    }

    /// Event bus; [`Bus::subscribe`] gives a raw receiver.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Subscribes to the bus and forwards events to the subscriber set until cancelled.
    pub(crate) fn subscriber_listener(&self, set: SubscriberSet) {
        let mut rx = self.bus.subscribe();
        let token = self.token.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(Arc::new(ev)),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "subscriber listener lagged behind the bus");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(Arc::new(ev)),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        });

        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }
}
