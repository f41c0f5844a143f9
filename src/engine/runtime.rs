// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::BuildPlan;
use crate::dag::DependencyGraph;
use crate::errors::{BuildError, Result};
use crate::exec::{TaskExecutor, WorkerPool};

use super::completion::{CompletionReceiver, completion_channel};
use super::core::{CoreCommand, CoreOrchestrator};
use super::ready_queue::ReadyQueue;
use super::result::BuildResult;
use super::BuildOptions;

/// Drives a [`CoreOrchestrator`] against the ready queue, the completion
/// queue and a [`WorkerPool`].
///
/// This is a pure IO shell: every scheduling decision is made by the core.
/// The shell only moves items between the core and the queues, and owns the
/// pool's lifetime.
pub struct Orchestrator {
    core: CoreOrchestrator,
    worker_count: usize,
    executor: Arc<dyn TaskExecutor>,
    options: BuildOptions,
    cancel: CancellationToken,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("core", &self.core)
            .field("worker_count", &self.worker_count)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        plan: &BuildPlan,
        executor: Arc<dyn TaskExecutor>,
        options: BuildOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            core: CoreOrchestrator::new(DependencyGraph::new(plan)),
            worker_count: plan.worker_count(),
            executor,
            options,
            cancel,
        }
    }

    /// Run the build to completion.
    ///
    /// Any error aborts the build: in-flight work is cancelled, the pool is
    /// torn down and the partial result is discarded.
    pub async fn run(mut self) -> Result<BuildResult> {
        info!(
            tasks = self.core.graph().len(),
            workers = self.worker_count,
            "build started"
        );

        let ready = Arc::new(ReadyQueue::new());
        let (completion_tx, mut completion_rx) = completion_channel();
        let mut pool = WorkerPool::spawn(
            self.worker_count,
            Arc::clone(&ready),
            completion_tx,
            Arc::clone(&self.executor),
            self.cancel.child_token(),
        );

        if let Err(e) = self
            .dispatch_until_drained(&ready, &mut completion_rx, &mut pool)
            .await
        {
            warn!(error = %e, "build failed; aborting worker pool");
            pool.abort().await;
            return Err(e);
        }

        pool.drain(self.options.drain_timeout).await?;

        let result = self.core.finish()?;
        info!(tasks = result.len(), batches = result.batch_count(), "build finished");
        Ok(result)
    }

    /// Execute core commands until the core asks to drain.
    async fn dispatch_until_drained(
        &mut self,
        ready: &ReadyQueue,
        completions: &mut CompletionReceiver,
        pool: &mut WorkerPool,
    ) -> Result<()> {
        loop {
            match self.core.step()? {
                CoreCommand::Dispatch(batch) => {
                    for item in batch {
                        ready.push(item);
                    }
                }
                CoreCommand::AwaitCompletion => {
                    let completion = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => {
                            return Err(BuildError::InterruptedExecution(
                                "build cancelled".to_string(),
                            ));
                        }
                        completion = completions.take() => match completion {
                            Ok(completion) => completion,
                            // Every sender is gone, so every worker has exited or is exiting.
                            Err(_) => return Err(pool.wait_for_exit().await),
                        },
                        fault = pool.wait_for_exit() => return Err(fault),
                    };
                    debug!(task = %completion.task, outcome = ?completion.outcome, "completion received");
                    self.core.receive(completion)?;
                }
                CoreCommand::Drain => return Ok(()),
            }
        }
    }
}
