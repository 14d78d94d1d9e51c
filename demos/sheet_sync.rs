//! # Example: sheet_sync
//!
//! Reads a batch of cells from a simulated spreadsheet API that allows only a few
//! requests per second, then waits for the batch to drain.
//!
//! Requests over the quota fail with `429 Quota exceeded`; the retrying caller backs
//! off and re-issues them until the quota window resets. One cell points at a
//! malformed range and fails fatally; it still counts as done for the drain.
//!
//! ## Flow
//! ```text
//! submit("read_cell", "A1") ... submit("read_cell", "H1")
//!   ├─► WorkerPool (3 workers)
//!   │     └─► RetryingCaller
//!   │           ├─ 429 → warn!, BackoffScheduled, sleep, retry
//!   │           ├─ 400 → TaskError::Failed (no retry)
//!   │           └─ Ok  → CallSucceeded
//!   └─► await_drain("sheet-sync") → Ok(Drained) after 3 empty polls
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example sheet_sync
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use drainvisor::{
    BackoffPolicy, CallError, Config, Coordinator, Event, EventKind, JitterPolicy, OpFn,
    OperationTable, Subscribe,
};
use tokio::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Fixed-window request quota shared by every worker.
struct QuotaApi {
    per_window: u32,
    window: Duration,
    state: Mutex<(Instant, u32)>,
}

impl QuotaApi {
    fn new(per_window: u32, window: Duration) -> Self {
        Self {
            per_window,
            window,
            state: Mutex::new((Instant::now(), 0)),
        }
    }

    async fn read(&self, cell: &str) -> Result<String, CallError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        {
            let mut state = self.state.lock().unwrap();
            if state.0.elapsed() >= self.window {
                *state = (Instant::now(), 0);
            }
            if state.1 >= self.per_window {
                return Err(CallError::from_status(429, "Quota exceeded for 'Read requests'"));
            }
            state.1 += 1;
        }
        if cell.contains('!') {
            return Err(CallError::from_status(400, format!("Unable to parse range: {cell}")));
        }
        Ok(format!("value of {cell}"))
    }
}

/// Prints retry and drain events.
struct Console;

#[async_trait]
impl Subscribe for Console {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::BackoffScheduled => println!(
                "[backoff] {task} attempt={} delay={}ms",
                e.attempt.unwrap_or(0),
                e.delay_ms.unwrap_or(0)
            ),
            EventKind::CallFailed => println!(
                "[failed] {task}: {}",
                e.reason.as_deref().unwrap_or("unknown")
            ),
            EventKind::DrainProgress => {
                println!("[drain] outstanding={}", e.outstanding.unwrap_or(0))
            }
            EventKind::DrainStable => println!("[drain] stable"),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut cfg = Config::default();
    cfg.backoff = BackoffPolicy {
        first: Duration::from_millis(250),
        max: Duration::from_secs(2),
        factor: 2.0,
        jitter: JitterPolicy::Additive {
            max: Duration::from_millis(100),
        },
    };
    cfg.monitor.poll_interval = Duration::from_millis(200);
    cfg.monitor.stability_window = 3;
    cfg.monitor.timeout = Duration::from_secs(30);
    cfg.monitor.grace_period = Duration::from_secs(2);

    let api = Arc::new(QuotaApi::new(3, Duration::from_secs(1)));
    let catalog: OperationTable<String, String, CallError> =
        OperationTable::new().register("read_cell", move |cell: String| {
            let api = Arc::clone(&api);
            OpFn::arc(move || {
                let (api, cell) = (Arc::clone(&api), cell.clone());
                async move { api.read(&cell).await }
            })
        });

    let coord = Coordinator::builder(cfg, catalog)
        .with_subscribers(vec![Arc::new(Console) as Arc<dyn Subscribe>])
        .build();

    let cells = ["A1", "B1", "C1", "D1", "Sheet9!ZZ", "E1", "F1", "G1", "H1"];
    let handles = cells
        .iter()
        .map(|cell| coord.submit("read_cell", cell.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    let drained = coord.await_drain("sheet-sync").await?;
    println!(
        "[main] drained in {:?} after {} polls",
        drained.elapsed, drained.polls
    );

    for (cell, h) in cells.iter().zip(handles) {
        match h.join().await {
            Ok(value) => println!("[main] {cell}: {value}"),
            Err(e) => println!("[main] {cell}: {e} ({})", e.as_label()),
        }
    }

    coord.shutdown().await;
    Ok(())
}
