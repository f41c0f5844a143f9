// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::config::BuildPlan;
use crate::dag::task::{ReadyItem, Task, TaskId};
use crate::errors::{BuildError, Result};

/// Mutable view of the build: every task that has not been dispatched yet,
/// together with the dependencies it is still waiting on.
///
/// The graph is owned by the orchestrator alone. Entries are removed when a
/// task is dispatched, and dependency sets shrink as completions are
/// resolved; nothing is ever added after construction.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Task -> dependencies that have not completed yet.
    remaining: BTreeMap<TaskId, BTreeSet<TaskId>>,
    durations: HashMap<TaskId, u64>,
    /// Task -> tasks that list it as a dependency.
    dependents: HashMap<TaskId, Vec<TaskId>>,
}

impl DependencyGraph {
    /// Build the graph for a validated [`BuildPlan`].
    pub fn new(plan: &BuildPlan) -> Self {
        Self::build(plan.tasks())
    }

    /// Build the graph from raw tasks, rejecting dependencies on unknown ids.
    ///
    /// This does not check for cycles; use [`BuildPlan`] for full validation.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Result<Self> {
        let tasks: Vec<&Task> = tasks.into_iter().collect();
        let known: BTreeSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();

        for task in &tasks {
            if let Some(dep) = task.dependencies.iter().find(|d| !known.contains(d.as_str())) {
                return Err(BuildError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}'",
                    task.id, dep
                )));
            }
        }

        Ok(Self::build(tasks))
    }

    fn build<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut remaining = BTreeMap::new();
        let mut durations = HashMap::new();
        let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();

        for task in tasks {
            remaining.insert(task.id.clone(), task.dependencies.clone());
            durations.insert(task.id.clone(), task.duration);
            for dep in task.dependencies.iter() {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .push(task.id.clone());
            }
        }

        Self {
            remaining,
            durations,
            dependents,
        }
    }

    /// All tasks whose dependency set is empty, in dispatch order
    /// (ascending duration, then id). Does not modify the graph.
    pub fn ready_tasks(&self) -> Vec<ReadyItem> {
        let mut ready: Vec<ReadyItem> = self
            .remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(id, _)| ReadyItem::new(id.clone(), self.duration_of(id)))
            .collect();
        ready.sort();
        ready
    }

    /// Drop the entry for a dispatched task.
    ///
    /// Returns `false` if the task was not (or no longer) in the graph.
    pub fn remove(&mut self, task: &str) -> bool {
        let removed = self.remaining.remove(task).is_some();
        trace!(task = %task, removed, "graph: remove");
        removed
    }

    /// Record that `completed` finished: it no longer blocks any remaining task.
    pub fn resolve(&mut self, completed: &str) {
        let Some(dependents) = self.dependents.get(completed) else {
            return;
        };

        for dependent in dependents {
            if let Some(deps) = self.remaining.get_mut(dependent) {
                deps.remove(completed);
                if deps.is_empty() {
                    debug!(task = %dependent, unblocked_by = %completed, "graph: task unblocked");
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn contains(&self, task: &str) -> bool {
        self.remaining.contains_key(task)
    }

    /// Dependencies `task` is still waiting on, or `None` once it is dispatched.
    pub fn remaining_dependencies(&self, task: &str) -> Option<&BTreeSet<TaskId>> {
        self.remaining.get(task)
    }

    /// Ids of every task not dispatched yet, sorted.
    pub fn remaining_tasks(&self) -> Vec<TaskId> {
        self.remaining.keys().cloned().collect()
    }

    fn duration_of(&self, task: &str) -> u64 {
        self.durations.get(task).copied().unwrap_or_default()
    }
}
