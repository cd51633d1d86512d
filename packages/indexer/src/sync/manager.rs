use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::DelegationsClient;
use crate::scheduler::{IntervalWorker, DEFAULT_WORKER_INTERVAL};

pub const DELEGATIONS_WORKER: &str = "worker-delegations";

/// Runs incremental sync cycles on a fixed interval.
pub struct SyncManager {
    client: DelegationsClient,
    name: String,
    interval: Duration,
}

impl SyncManager {
    pub fn new(client: DelegationsClient) -> Self {
        Self {
            client,
            name: DELEGATIONS_WORKER.to_string(),
            interval: DEFAULT_WORKER_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Start the worker. Cycles observe `cancel` too, so a shutdown interrupts an in-flight cycle.
    pub fn start(self, cancel: CancellationToken) -> IntervalWorker {
        info!(
            "Starting sync manager {} every {}s",
            self.name,
            self.interval.as_secs()
        );

        let client = self.client;
        let token = cancel.clone();

        IntervalWorker::start(
            &self.name,
            move || {
                let client = client.clone();
                let token = token.clone();
                async move { client.run_cycle(&token).await }
            },
            self.interval,
            cancel,
        )
    }
}
