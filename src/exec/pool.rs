// src/exec/pool.rs

//! Fixed-size pool of workers consuming the ready queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::{Completion, CompletionSender, Dispatch, ReadyQueue};
use crate::errors::{BuildError, Result};
use crate::exec::TaskExecutor;

/// N workers, each running [`worker_loop`] until it sees a stop signal.
///
/// Dropping the pool aborts any worker that is still running.
pub struct WorkerPool {
    ready: Arc<ReadyQueue>,
    workers: JoinSet<()>,
    size: usize,
    cancel: CancellationToken,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("running", &self.workers.len())
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    /// Spawn `size` workers on the current Tokio runtime.
    ///
    /// Cancelling `cancel` interrupts in-flight executions; the workers then
    /// exit without reporting.
    pub fn spawn(
        size: usize,
        ready: Arc<ReadyQueue>,
        completions: CompletionSender,
        executor: Arc<dyn TaskExecutor>,
        cancel: CancellationToken,
    ) -> Self {
        let mut workers = JoinSet::new();

        for worker in 0..size {
            workers.spawn(worker_loop(
                worker,
                Arc::clone(&ready),
                completions.clone(),
                Arc::clone(&executor),
                cancel.clone(),
            ));
        }

        debug!(size, "worker pool started");

        Self {
            ready,
            workers,
            size,
            cancel,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Workers that have not been joined yet.
    pub fn running(&self) -> usize {
        self.workers.len()
    }

    /// Wait until some worker exits and describe why that is a fault.
    ///
    /// While tasks are outstanding no worker should ever exit, so the
    /// orchestrator races this against the completion queue.
    pub async fn wait_for_exit(&mut self) -> BuildError {
        match self.workers.join_next().await {
            Some(Err(e)) if e.is_panic() => BuildError::WorkerPanicked(e.to_string()),
            Some(_) => BuildError::InterruptedExecution(
                "worker exited before the build finished".to_string(),
            ),
            None => BuildError::InterruptedExecution("no workers running".to_string()),
        }
    }

    /// Send one stop signal per worker and wait for all of them to exit,
    /// bounded by `timeout`.
    pub async fn drain(mut self, timeout: Duration) -> Result<()> {
        debug!(size = self.size, ?timeout, "draining worker pool");
        self.ready.push_stop(self.size);

        match tokio::time::timeout(timeout, join_all(&mut self.workers)).await {
            Ok(joined) => {
                info!(size = self.size, "all workers stopped");
                joined
            }
            Err(_) => {
                let outstanding = self.workers.len();
                warn!(outstanding, ?timeout, "workers did not stop in time; aborting them");
                self.cancel.cancel();
                self.workers.abort_all();
                Err(BuildError::ShutdownTimeout {
                    timeout,
                    outstanding,
                })
            }
        }
    }

    /// Tear the pool down after a failure: cancel in-flight work, wake idle
    /// workers and wait for every task to go away.
    pub async fn abort(mut self) {
        warn!(running = self.workers.len(), "aborting worker pool");
        self.cancel.cancel();
        self.ready.close();
        self.workers.abort_all();
        while self.workers.join_next().await.is_some() {}
    }
}

async fn join_all(workers: &mut JoinSet<()>) -> Result<()> {
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                return Err(BuildError::WorkerPanicked(e.to_string()));
            }
        }
    }
    Ok(())
}

/// The per-worker consume loop: take, execute, report, repeat.
async fn worker_loop(
    worker: usize,
    ready: Arc<ReadyQueue>,
    completions: CompletionSender,
    executor: Arc<dyn TaskExecutor>,
    cancel: CancellationToken,
) {
    debug!(worker, "worker started");

    loop {
        let item = match ready.take().await {
            Ok(Dispatch::Task(item)) => item,
            Ok(Dispatch::Stop) => {
                debug!(worker, "stop signal received");
                break;
            }
            Err(e) => {
                debug!(worker, error = %e, "ready queue unavailable; worker exiting");
                break;
            }
        };

        debug!(worker, task = %item, "executing task");

        let outcome = tokio::select! {
            outcome = executor.execute(&item) => outcome,
            _ = cancel.cancelled() => {
                debug!(worker, task = %item, "execution cancelled");
                break;
            }
        };

        if let Err(e) = completions.send(Completion {
            task: item.task,
            outcome,
        }) {
            debug!(worker, error = %e, "could not report completion; worker exiting");
            break;
        }
    }

    debug!(worker, "worker finished");
}
