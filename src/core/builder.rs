use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{coordinator::Coordinator, pool::WorkerPool, registry::TaskRegistry};
use crate::{
    config::Config,
    events::Bus,
    monitor::{CompletionMonitor, Escalate, StatusSink},
    operations::Catalog,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Coordinator`] with optional features.
pub struct CoordinatorBuilder<C: Catalog> {
    cfg: Config,
    catalog: C,
    subscribers: Vec<Arc<dyn Subscribe>>,
    sink: Option<Arc<dyn StatusSink>>,
    escalation: Option<Arc<dyn Escalate>>,
}

impl<C: Catalog> CoordinatorBuilder<C> {
    /// Creates a new builder with the given configuration and catalog.
    pub fn new(cfg: Config, catalog: C) -> Self {
        Self {
            cfg,
            catalog,
            subscribers: Vec::new(),
            sink: None,
            escalation: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (submissions, backoff, drain progress)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the sink that receives drain timeout reports (default: `tracing` at warn).
    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the hook consulted after a drain timeout.
    pub fn with_escalation(mut self, hook: Arc<dyn Escalate>) -> Self {
        self.escalation = Some(hook);
        self
    }

    /// Builds the coordinator.
    ///
    /// Must be called from within a tokio runtime when subscribers are set: their
    /// workers and the bus listener are spawned here.
    pub fn build(self) -> Arc<Coordinator<C>> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let registry = Arc::new(TaskRegistry::new());
        let pool = WorkerPool::from_config(&self.cfg, registry, bus.clone());

        let mut monitor = CompletionMonitor::new(self.cfg.monitor).with_bus(bus.clone());
        if let Some(sink) = self.sink {
            monitor = monitor.with_status_sink(sink);
        }
        if let Some(hook) = self.escalation {
            monitor = monitor.with_escalation(hook);
        }

        let coord = Arc::new(Coordinator::new_internal(
            self.cfg,
            self.catalog,
            pool,
            monitor,
            bus.clone(),
            CancellationToken::new(),
        ));

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus);
            coord.subscriber_listener(set);
        }
        coord
    }
}
