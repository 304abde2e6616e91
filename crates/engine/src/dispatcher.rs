//! Background run dispatcher.
//!
//! Polls for QUEUED runs every `poll_interval` and hands them to the
//! [`RunProcessor`]. Uses `SELECT FOR UPDATE SKIP LOCKED` via
//! [`RunRepo::claim_next`] to prevent double-dispatch across worker
//! processes.

use std::sync::Arc;
use std::time::Duration;

use fixline_db::repositories::RunRepo;
use sqlx::PgPool;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::processor::RunProcessor;

/// Default polling interval for the dispatcher loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How many runs one cycle claims and executes in parallel. Ordering only
/// holds within a single run, never between runs.
const DEFAULT_BATCH_SIZE: usize = 4;

/// Background run dispatcher.
///
/// A single long-lived Tokio task that drains the queued-run backlog.
pub struct RunDispatcher {
    pool: PgPool,
    processor: Arc<RunProcessor>,
    poll_interval: Duration,
    batch_size: usize,
}

impl RunDispatcher {
    /// Create a new dispatcher with the default 1-second poll interval.
    pub fn new(pool: PgPool, processor: Arc<RunProcessor>) -> Self {
        Self {
            pool,
            processor,
            poll_interval: DEFAULT_POLL_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the dispatcher loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            batch_size = self.batch_size,
            "Run dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Run dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.try_dispatch().await {
                        tracing::error!(error = %e, "Dispatch cycle failed");
                    }
                }
            }
        }
    }

    /// One dispatch cycle: claim up to `batch_size` runs and execute them
    /// in parallel. Per-run failures are already recorded on the run row;
    /// here they are only logged.
    async fn try_dispatch(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut claimed = Vec::new();
        while claimed.len() < self.batch_size {
            match RunRepo::claim_next(&self.pool).await? {
                Some(run) => claimed.push(run),
                None => break,
            }
        }
        if claimed.is_empty() {
            return Ok(());
        }

        let mut tasks = JoinSet::new();
        for run in claimed {
            let processor = self.processor.clone();
            tracing::info!(
                run_id = run.id,
                playbook = %run.playbook_key,
                "Run claimed for processing",
            );
            tasks.spawn(async move {
                let run_id = run.id;
                if let Err(e) = processor.run_claimed(run).await {
                    tracing::error!(run_id, error = %e, "Run processing failed");
                }
            });
        }
        while tasks.join_next().await.is_some() {}

        Ok(())
    }
}
