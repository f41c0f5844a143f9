// src/engine/completion.rs

//! FIFO carrying completion reports from workers back to the orchestrator.

use tokio::sync::mpsc;

use crate::dag::TaskId;
use crate::engine::TaskOutcome;
use crate::errors::{BuildError, Result};

/// A worker's report that it finished executing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task: TaskId,
    pub outcome: TaskOutcome,
}

impl Completion {
    pub fn success(task: impl Into<TaskId>) -> Self {
        Self {
            task: task.into(),
            outcome: TaskOutcome::Success,
        }
    }

    pub fn failed(task: impl Into<TaskId>, reason: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            outcome: TaskOutcome::Failed(reason.into()),
        }
    }
}

/// Create a connected sender/receiver pair.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CompletionSender { tx }, CompletionReceiver { rx })
}

/// Worker side. Cloned once per worker.
#[derive(Debug, Clone)]
pub struct CompletionSender {
    tx: mpsc::UnboundedSender<Completion>,
}

impl CompletionSender {
    pub fn send(&self, completion: Completion) -> Result<()> {
        self.tx.send(completion).map_err(|e| {
            BuildError::InterruptedExecution(format!(
                "completion queue closed before '{}' was reported",
                e.0.task
            ))
        })
    }
}

/// Orchestrator side.
#[derive(Debug)]
pub struct CompletionReceiver {
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl CompletionReceiver {
    /// Wait for the next completion.
    ///
    /// Fails if every sender was dropped, i.e. no worker is left to report.
    pub async fn take(&mut self) -> Result<Completion> {
        self.rx.recv().await.ok_or_else(|| {
            BuildError::InterruptedExecution(
                "completion queue closed: no workers left".to_string(),
            )
        })
    }

    /// Non-blocking variant, used by tests and diagnostics.
    pub fn try_take(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}
