// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the ready queue that feeds workers in shortest-task-first order
//! - the completion queue that reports finished tasks back
//! - the pure core state machine that owns the dependency graph
//! - the async runtime that drives the core against the queues and the
//!   worker pool
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::time::Duration;

pub mod completion;
pub mod core;
pub mod ready_queue;
pub mod result;
pub mod runtime;

pub use completion::{Completion, CompletionReceiver, CompletionSender, completion_channel};
pub use self::core::{CoreCommand, CoreOrchestrator, Phase};
pub use ready_queue::{Dispatch, ReadyQueue};
pub use result::BuildResult;
pub use runtime::Orchestrator;

/// Outcome of executing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(String),
}

/// Knobs for a single build run.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// How long workers get to acknowledge their stop signal.
    pub drain_timeout: Duration,
}

pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}
