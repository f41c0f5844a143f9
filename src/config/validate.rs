// src/config/validate.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::config::model::{BuildManifest, BuildPlan, RawManifest};
use crate::dag::{Task, TaskId};
use crate::errors::{BuildError, Result};

impl TryFrom<RawManifest> for BuildManifest {
    type Error = BuildError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        ensure_has_tasks(&raw)?;

        let durations = raw
            .task
            .iter()
            .map(|(id, section)| (id.clone(), section.duration));
        let dependencies = raw
            .task
            .iter()
            .map(|(id, section)| (id.clone(), section.after.clone()));

        let plan = BuildPlan::new(durations, dependencies, raw.settings.workers)?;
        Ok(BuildManifest::new_unchecked(raw.settings, plan))
    }
}

fn ensure_has_tasks(raw: &RawManifest) -> Result<()> {
    if raw.task.is_empty() {
        return Err(BuildError::ConfigError(
            "manifest must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

/// Every task named in the dependency map must also have a duration.
pub(crate) fn ensure_durations_known(
    durations: &BTreeMap<TaskId, u64>,
    dependencies: &BTreeMap<TaskId, BTreeSet<TaskId>>,
) -> Result<()> {
    for id in dependencies.keys() {
        if !durations.contains_key(id) {
            return Err(BuildError::ConfigError(format!(
                "task '{}' has dependencies but no duration",
                id
            )));
        }
    }
    Ok(())
}

/// Checks run before any scheduling starts:
/// - `worker_count >= 1`
/// - every dependency refers to a known task
/// - the dependency relation is acyclic
pub(crate) fn validate_plan(tasks: &BTreeMap<TaskId, Task>, worker_count: usize) -> Result<()> {
    validate_worker_count(worker_count)?;
    validate_task_dependencies(tasks)?;
    validate_dag(tasks)?;
    debug!(tasks = tasks.len(), worker_count, "build plan validated");
    Ok(())
}

pub(crate) fn validate_worker_count(worker_count: usize) -> Result<()> {
    if worker_count == 0 {
        return Err(BuildError::ConfigError(
            "worker count must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_dependencies(tasks: &BTreeMap<TaskId, Task>) -> Result<()> {
    for (id, task) in tasks.iter() {
        for dep in task.dependencies.iter() {
            if !tasks.contains_key(dep) {
                return Err(BuildError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}'",
                    id, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(tasks: &BTreeMap<TaskId, Task>) -> Result<()> {
    // Edge direction: dep -> task. A self-dependency becomes a self-loop and
    // is reported as a cycle of one.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in tasks.keys() {
        graph.add_node(id.as_str());
    }

    for (id, task) in tasks.iter() {
        for dep in task.dependencies.iter() {
            graph.add_edge(dep.as_str(), id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(BuildError::CycleError {
            cycle: cycle_members(&graph, cycle.node_id()),
        }),
    }
}

/// Name the tasks of one cycle: the strongly connected component holding
/// `hint`, or the smallest cyclic component if `hint` is not part of one.
fn cycle_members(graph: &DiGraphMap<&str, ()>, hint: &str) -> Vec<TaskId> {
    let mut cyclic: Vec<Vec<TaskId>> = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut names: Vec<TaskId> = scc.into_iter().map(str::to_string).collect();
            names.sort();
            names
        })
        .collect();

    if let Some(pos) = cyclic.iter().position(|scc| scc.iter().any(|n| n == hint)) {
        return cyclic.swap_remove(pos);
    }

    cyclic.sort();
    cyclic
        .into_iter()
        .next()
        .unwrap_or_else(|| vec![hint.to_string()])
}
