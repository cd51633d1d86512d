//! Named interval workers.
//!
//! Each worker owns its timer and awaits its task inline, so a task never
//! overlaps with itself and workers never wait on each other. Ticks that pass
//! while a run is in flight are absorbed rather than queued.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Interval used when a worker is started with a zero interval
pub const DEFAULT_WORKER_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for the next tick
    Idle,
    /// A task run is in flight
    Running,
    /// Cancelled; terminal
    Stopped,
}

/// Handle to a running interval worker.
pub struct IntervalWorker {
    name: String,
    state: watch::Receiver<WorkerState>,
    handle: JoinHandle<()>,
}

impl IntervalWorker {
    /// Spawn a worker that runs `task` once per `interval` until `cancel` fires.
    ///
    /// The first run happens one interval after start. Task failures are logged
    /// and the worker keeps ticking; only `cancel` stops it. A run already in
    /// flight when `cancel` fires is awaited, not aborted, so tasks that must
    /// stop early should watch the same token.
    pub fn start<F, Fut, O, E>(
        name: &str,
        mut task: F,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        O: Debug + Send + 'static,
        E: Display + Send + 'static,
    {
        let interval = if interval.is_zero() {
            DEFAULT_WORKER_INTERVAL
        } else {
            interval
        };

        let (state_tx, state_rx) = watch::channel(WorkerState::Idle);
        let worker_name = name.to_string();

        info!("[WORKER] {} started, interval {:?}", name, interval);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                debug!("[WORKER] {} called", worker_name);
                state_tx.send_replace(WorkerState::Running);

                match task().await {
                    Ok(outcome) => info!("[WORKER] {} completed: {:?}", worker_name, outcome),
                    Err(e) if cancel.is_cancelled() => {
                        warn!("[WORKER] {} interrupted by shutdown: {}", worker_name, e)
                    }
                    Err(e) => error!("[WORKER] {} failed: {}", worker_name, e),
                }

                state_tx.send_replace(WorkerState::Idle);
            }

            state_tx.send_replace(WorkerState::Stopped);
            info!("[WORKER] {} stopped", worker_name);
        });

        Self {
            name: name.to_string(),
            state: state_rx,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Receiver that keeps observing state changes after the handle is consumed.
    pub fn state_receiver(&self) -> watch::Receiver<WorkerState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker loop to exit. Only returns after cancellation.
    pub async fn join(self) -> Result<(), JoinError> {
        self.handle.await
    }
}
