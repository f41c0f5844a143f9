// src/errors.rs

//! Crate-wide error type and result alias.

use std::time::Duration;

use thiserror::Error;

use crate::dag::TaskId;

#[derive(Error, Debug)]
pub enum BuildError {
    /// Malformed input, raised before anything is dispatched.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("the dependency mapping contains a cycle between tasks: [{}]", .cycle.join(", "))]
    CycleError { cycle: Vec<TaskId> },

    #[error("Interrupted while waiting: {0}")]
    InterruptedExecution(String),

    #[error("{outstanding} worker(s) did not stop within {timeout:?}")]
    ShutdownTimeout {
        timeout: Duration,
        outstanding: usize,
    },

    #[error("Task '{task}' failed: {reason}")]
    TaskFailed { task: TaskId, reason: String },

    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    /// Nothing is ready, nothing is in flight, but tasks remain.
    #[error("Scheduler stalled with {} task(s) left: [{}]", .remaining.len(), .remaining.join(", "))]
    Stalled { remaining: Vec<TaskId> },

    #[error("Completion reported for task '{0}' which is not in flight")]
    UnexpectedCompletion(TaskId),

    #[error("Invalid orchestrator transition: {0}")]
    InvalidTransition(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildError>;
