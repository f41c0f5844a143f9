// src/dag/task.rs

//! Task metadata and the dispatchable ready item.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Canonical task identifier type used throughout the crate.
pub type TaskId = String;

/// Static description of a task. Never mutated once the build starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    /// Abstract time units; zero is valid and simply sorts first.
    pub duration: u64,
    /// Tasks that must complete before this one becomes ready.
    pub dependencies: BTreeSet<TaskId>,
}

impl Task {
    pub fn new<I, S>(id: impl Into<TaskId>, duration: u64, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        Self {
            id: id.into(),
            duration,
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }
}

/// A task that is eligible for dispatch.
///
/// Ordered by ascending `duration`; equal durations fall back to the task id
/// so that ordering is total and reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadyItem {
    pub task: TaskId,
    pub duration: u64,
}

impl ReadyItem {
    pub fn new(task: impl Into<TaskId>, duration: u64) -> Self {
        Self {
            task: task.into(),
            duration,
        }
    }
}

impl Ord for ReadyItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.duration
            .cmp(&other.duration)
            .then_with(|| self.task.cmp(&other.task))
    }
}

impl PartialOrd for ReadyItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReadyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.task, self.duration)
    }
}
