//! # WorkerPool: bounded dispatch of remote operations.
//!
//! The pool turns an [`Operation`](crate::Operation) into a tracked task:
//!
//! ```text
//! submit(catalog, name, args) / spawn(label, op)
//!     ├─► registry.track(label, || runtime.spawn(worker))     (under registry lock)
//!     │        worker:
//!     │          ├─► acquire semaphore permit   (closed pool → TaskError::PoolClosed)
//!     │          └─► caller.execute(label, op)  (retries while holding the permit)
//!     ├─► publish TaskSubmitted
//!     └─► return TaskHandle                    (never waits for the operation)
//! ```
//!
//! ## Rules
//! - At most `max_workers` operations execute at once; the rest wait for a permit.
//! - The task is registered before `submit`/`spawn` returns.
//! - A retry sleeping in backoff keeps its permit.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::{
    config::Config,
    core::{caller::RetryingCaller, handle::TaskHandle, registry::TaskRegistry},
    error::{PoolError, TaskError},
    events::{Bus, Event, EventKind},
    operations::{Catalog, OperationRef},
    policies::Classify,
};

/// Bounded concurrency executor for remote operations.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    max_workers: usize,
    caller: Arc<RetryingCaller>,
    registry: Arc<TaskRegistry>,
    bus: Bus,
}

impl WorkerPool {
    /// Creates a pool running at most `max_workers` (min 1) operations at once.
    pub fn new(
        max_workers: usize,
        caller: RetryingCaller,
        registry: Arc<TaskRegistry>,
        bus: Bus,
    ) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            caller: Arc::new(caller),
            registry,
            bus,
        }
    }

    /// Creates a pool (and its retrying caller) from a [`Config`].
    pub fn from_config(cfg: &Config, registry: Arc<TaskRegistry>, bus: Bus) -> Self {
        let caller =
            RetryingCaller::new(cfg.backoff, bus.clone()).with_max_attempts(cfg.attempt_limit());
        Self::new(cfg.worker_limit(), caller, registry, bus)
    }

    /// Resolves `name` in `catalog`, binds `args`, and dispatches it.
    ///
    /// The operation name doubles as the task label.
    pub fn submit<C: Catalog>(
        &self,
        catalog: &C,
        name: &str,
        args: C::Args,
    ) -> Result<TaskHandle<C::Output, C::Error>, PoolError> {
        let op = catalog
            .resolve(name, args)
            .ok_or_else(|| PoolError::UnknownOperation {
                name: name.to_string(),
            })?;
        self.spawn(name, op)
    }

    /// Dispatches an already-bound operation under `label`.
    pub fn spawn<T, E>(
        &self,
        label: impl Into<Arc<str>>,
        op: OperationRef<T, E>,
    ) -> Result<TaskHandle<T, E>, PoolError>
    where
        T: Send + 'static,
        E: Classify + fmt::Display + Send + 'static,
    {
        if self.semaphore.is_closed() {
            return Err(PoolError::Closed);
        }
        let runtime = Handle::try_current().map_err(|_| PoolError::NoRuntime)?;

        let label: Arc<str> = label.into();
        let semaphore = Arc::clone(&self.semaphore);
        let caller = Arc::clone(&self.caller);
        let task_label = Arc::clone(&label);

        let worker = async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_closed| TaskError::PoolClosed)?;
            caller
                .execute(&task_label, op.as_ref())
                .await
                .map_err(TaskError::Failed)
        };

        let join = self
            .registry
            .track(Arc::clone(&label), || runtime.spawn(worker));

        debug!(task = %label, "operation submitted");
        self.bus
            .publish(Event::new(EventKind::TaskSubmitted).with_task(Arc::clone(&label)));
        Ok(TaskHandle::new(label, join))
    }

    /// Stops accepting work. Queued operations that have not started fail with
    /// [`TaskError::PoolClosed`]; running ones finish normally.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// True once [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Configured worker ceiling.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Currently free worker slots.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Registry every dispatched task is tracked in.
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallError, Drain, OpFn, OperationTable};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn pool(workers: usize) -> WorkerPool {
        let cfg = Config {
            max_workers: workers,
            ..Config::default()
        };
        WorkerPool::from_config(&cfg, Arc::new(TaskRegistry::new()), Bus::new(256))
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_never_exceeds_ceiling() {
        let pool = pool(3);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..10 {
            let (running, peak) = (running.clone(), peak.clone());
            let op = OpFn::arc(move || {
                let (running, peak) = (running.clone(), peak.clone());
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, CallError>(())
                }
            });
            handles.push(pool.spawn(format!("op-{i}"), op).unwrap());
        }
        assert_eq!(pool.registry().len(), 10);

        for h in handles {
            h.join().await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(pool.available(), 3);
        assert_eq!(pool.registry().prune_and_snapshot().remaining, 0);
    }

    #[tokio::test]
    async fn submit_resolves_by_name_and_surfaces_fatal() {
        let pool = pool(2);
        let table: OperationTable<u32, u32, CallError> = OperationTable::new()
            .register("square", |n: u32| {
                OpFn::arc(move || async move { Ok::<_, CallError>(n * n) })
            })
            .register("reject", |_n: u32| {
                OpFn::arc(|| async {
                    Err::<u32, _>(CallError::Fatal {
                        reason: "bad request".into(),
                    })
                })
            });

        let ok = pool.submit(&table, "square", 9).unwrap();
        assert_eq!(ok.label(), "square");
        assert_eq!(ok.join().await.unwrap(), 81);

        let bad = pool.submit(&table, "reject", 0).unwrap();
        match bad.join().await {
            Err(TaskError::Failed(CallError::Fatal { reason })) => assert_eq!(reason, "bad request"),
            other => panic!("unexpected: {other:?}"),
        }

        let missing = pool.submit(&table, "cube", 3).unwrap_err();
        assert_eq!(
            missing,
            PoolError::UnknownOperation {
                name: "cube".into()
            }
        );
    }

    #[tokio::test]
    async fn closed_pool_rejects_and_fails_queued_work() {
        let pool = pool(1);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let release_rx = Arc::new(tokio::sync::Mutex::new(Some(release_rx)));

        let blocker = OpFn::arc(move || {
            let rx = release_rx.clone();
            async move {
                if let Some(rx) = rx.lock().await.take() {
                    let _ = rx.await;
                }
                Ok::<_, CallError>(())
            }
        });
        let running = pool.spawn("blocker", blocker).unwrap();
        while pool.available() > 0 {
            tokio::task::yield_now().await;
        }

        let queued = pool
            .spawn("queued", OpFn::arc(|| async { Ok::<_, CallError>(()) }))
            .unwrap();
        pool.close();
        assert!(pool.is_closed());

        let rejected = pool.spawn("late", OpFn::arc(|| async { Ok::<_, CallError>(()) }));
        assert_eq!(rejected.unwrap_err(), PoolError::Closed);

        assert!(matches!(queued.join().await, Err(TaskError::PoolClosed)));
        release_tx.send(()).unwrap();
        running.join().await.unwrap();
    }

    #[test]
    fn spawn_outside_runtime_is_an_error() {
        let pool = pool(1);
        let err = pool
            .spawn("orphan", OpFn::arc(|| async { Ok::<_, CallError>(()) }))
            .unwrap_err();
        assert_eq!(err, PoolError::NoRuntime);
    }

    #[tokio::test]
    async fn panicking_operation_is_reported_and_still_drains() {
        let pool = pool(1);
        let handle = pool
            .spawn(
                "explode",
                OpFn::arc(|| async {
                    if true {
                        panic!("sheet client poisoned");
                    }
                    Ok::<(), CallError>(())
                }),
            )
            .unwrap();

        match handle.join().await {
            Err(TaskError::Panicked { reason }) => assert_eq!(reason, "sheet client poisoned"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(pool.registry().prune_and_snapshot().remaining, 0);
    }
}
