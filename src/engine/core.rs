// src/engine/core.rs

//! Pure orchestration state machine.
//!
//! [`CoreOrchestrator`] owns the [`DependencyGraph`], the [`BuildResult`] and
//! the set of in-flight tasks. It never touches a queue, a channel or a
//! worker: it tells the async shell (`engine::runtime`) what to do next via
//! [`CoreCommand`]s, and is fed completions back.
//!
//! ```text
//! Scanning -> Dispatching -> AwaitingCompletion -> Resolving -> Scanning ...
//!          \-> Draining -> Done
//! ```
//!
//! Every transition is a separate method so it can be driven and checked on
//! its own; [`CoreOrchestrator::step`] chains the ones that need no IO.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, warn};

use crate::dag::{DependencyGraph, ReadyItem, TaskId};
use crate::engine::completion::Completion;
use crate::engine::result::BuildResult;
use crate::engine::TaskOutcome;
use crate::errors::{BuildError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Dispatching,
    AwaitingCompletion,
    Resolving,
    Draining,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What the IO shell must do before calling [`CoreOrchestrator::step`] again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Push these items to the ready queue, in order.
    Dispatch(Vec<ReadyItem>),
    /// Block for one completion and hand it to [`CoreOrchestrator::receive`].
    AwaitCompletion,
    /// Stop the workers, then call [`CoreOrchestrator::finish`].
    Drain,
}

#[derive(Debug)]
pub struct CoreOrchestrator {
    graph: DependencyGraph,
    result: BuildResult,
    in_flight: BTreeSet<TaskId>,
    phase: Phase,
    /// Batch found by the last scan, waiting for `dispatch`.
    staged_batch: Vec<ReadyItem>,
    /// Completion handed to `receive`, waiting for `resolve`.
    staged_completion: Option<Completion>,
}

impl CoreOrchestrator {
    pub fn new(graph: DependencyGraph) -> Self {
        Self {
            graph,
            result: BuildResult::new(),
            in_flight: BTreeSet::new(),
            phase: Phase::Scanning,
            staged_batch: Vec::new(),
            staged_completion: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn result(&self) -> &BuildResult {
        &self.result
    }

    /// Tasks dispatched but not yet resolved.
    pub fn in_flight(&self) -> &BTreeSet<TaskId> {
        &self.in_flight
    }

    /// Advance through every transition that needs no IO and return the next
    /// command for the shell.
    pub fn step(&mut self) -> Result<CoreCommand> {
        loop {
            match self.phase {
                Phase::Scanning => {
                    self.scan()?;
                }
                Phase::Dispatching => return Ok(CoreCommand::Dispatch(self.dispatch()?)),
                Phase::AwaitingCompletion => return Ok(CoreCommand::AwaitCompletion),
                Phase::Resolving => self.resolve()?,
                Phase::Draining => return Ok(CoreCommand::Drain),
                Phase::Done => return Err(self.invalid("step")),
            }
        }
    }

    /// Scanning: look at the graph and pick the next phase.
    pub fn scan(&mut self) -> Result<Phase> {
        self.expect_phase(Phase::Scanning, "scan")?;

        let ready = self.graph.ready_tasks();
        self.phase = if !ready.is_empty() {
            self.staged_batch = ready;
            Phase::Dispatching
        } else if !self.in_flight.is_empty() {
            Phase::AwaitingCompletion
        } else if self.graph.is_empty() {
            Phase::Draining
        } else {
            let remaining = self.graph.remaining_tasks();
            warn!(?remaining, "nothing ready and nothing in flight");
            return Err(BuildError::Stalled { remaining });
        };

        debug!(
            next = %self.phase,
            ready = self.staged_batch.len(),
            in_flight = self.in_flight.len(),
            remaining = self.graph.len(),
            "core: scanned"
        );
        Ok(self.phase)
    }

    /// Dispatching: record the staged batch, take it out of the graph and
    /// mark it in flight. Returns the batch for the shell to enqueue.
    pub fn dispatch(&mut self) -> Result<Vec<ReadyItem>> {
        self.expect_phase(Phase::Dispatching, "dispatch")?;

        let batch = std::mem::take(&mut self.staged_batch);
        self.result.push_batch(&batch);
        for item in batch.iter() {
            self.graph.remove(&item.task);
            self.in_flight.insert(item.task.clone());
        }

        let names: Vec<String> = batch.iter().map(ToString::to_string).collect();
        debug!(batch = ?names, "core: dispatching batch");
        self.phase = Phase::AwaitingCompletion;
        Ok(batch)
    }

    /// AwaitingCompletion -> Resolving: accept the completion the shell
    /// received.
    pub fn receive(&mut self, completion: Completion) -> Result<()> {
        self.expect_phase(Phase::AwaitingCompletion, "receive")?;
        self.staged_completion = Some(completion);
        self.phase = Phase::Resolving;
        Ok(())
    }

    /// Resolving: unblock dependents of the completed task.
    pub fn resolve(&mut self) -> Result<()> {
        self.expect_phase(Phase::Resolving, "resolve")?;
        let Some(Completion { task, outcome }) = self.staged_completion.take() else {
            return Err(self.invalid("resolve without a completion"));
        };

        if !self.in_flight.remove(&task) {
            return Err(BuildError::UnexpectedCompletion(task));
        }

        if let TaskOutcome::Failed(reason) = outcome {
            warn!(task = %task, %reason, "task failed; aborting build");
            return Err(BuildError::TaskFailed { task, reason });
        }

        debug!(task = %task, in_flight = self.in_flight.len(), "core: resolving completion");
        self.graph.resolve(&task);
        self.phase = Phase::Scanning;
        Ok(())
    }

    /// Draining -> Done: hand over the finished result.
    pub fn finish(&mut self) -> Result<BuildResult> {
        self.expect_phase(Phase::Draining, "finish")?;
        self.phase = Phase::Done;
        Ok(std::mem::take(&mut self.result))
    }

    fn expect_phase(&self, expected: Phase, action: &str) -> Result<()> {
        if self.phase != expected {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    fn invalid(&self, action: &str) -> BuildError {
        BuildError::InvalidTransition(format!("cannot {} while {}", action, self.phase))
    }
}
