// src/config/model.rs

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::Deserialize;

use crate::dag::{Task, TaskId};
use crate::engine::BuildOptions;
use crate::errors::{BuildError, Result};
use crate::exec::SimulatedExecutor;

/// Top-level build manifest as read from a TOML file.
///
/// ```toml
/// [settings]
/// workers = 4
/// drain_timeout_ms = 10000
///
/// [task.A]
/// duration = 5
/// after = ["B", "C"]
///
/// [task.B]
/// duration = 10
/// ```
///
/// This is the raw, unvalidated form. Use [`BuildManifest::try_from`] (or
/// [`crate::config::load_and_validate`]) to obtain a validated manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub settings: SettingsSection,

    /// Keys are the task ids (e.g. `"A"`, `"core-lib"`).
    #[serde(default)]
    pub task: BTreeMap<String, TaskSection>,
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsSection {
    /// Number of concurrent workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Upper bound on how long the pool may take to stop once the build is
    /// finished.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Wall-clock length of one duration unit for the simulated executor.
    ///
    /// `0` (the default) means tasks complete immediately.
    #[serde(default)]
    pub time_unit_ms: u64,
}

fn default_workers() -> usize {
    1
}

fn default_drain_timeout_ms() -> u64 {
    10_000
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            drain_timeout_ms: default_drain_timeout_ms(),
            time_unit_ms: 0,
        }
    }
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSection {
    pub duration: u64,

    /// Prerequisites: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,
}

/// A validated set of tasks plus the worker count to run them with.
///
/// Construction goes through [`BuildPlan::new`] or [`BuildPlan::from_tasks`],
/// both of which reject unknown dependencies, a zero worker count and
/// cyclic dependency relations.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    tasks: BTreeMap<TaskId, Task>,
    worker_count: usize,
}

impl BuildPlan {
    /// Build a plan from a duration map and a dependency map.
    ///
    /// The task universe is the union of both key sets. A task with a duration
    /// but no dependency entry has no prerequisites; a task with a dependency
    /// entry but no duration is rejected.
    pub fn new<K, D, V>(
        durations: impl IntoIterator<Item = (K, u64)>,
        dependencies: impl IntoIterator<Item = (K, D)>,
        worker_count: usize,
    ) -> Result<Self>
    where
        K: Into<TaskId>,
        D: IntoIterator<Item = V>,
        V: Into<TaskId>,
    {
        let mut known: BTreeMap<TaskId, u64> = BTreeMap::new();
        for (id, duration) in durations {
            let id: TaskId = id.into();
            if known.contains_key(&id) {
                return Err(duplicate_task(&id));
            }
            known.insert(id, duration);
        }
        let durations = known;

        let mut deps: BTreeMap<TaskId, BTreeSet<TaskId>> = BTreeMap::new();
        for (id, list) in dependencies {
            deps.entry(id.into())
                .or_default()
                .extend(list.into_iter().map(Into::<TaskId>::into));
        }

        super::validate::ensure_durations_known(&durations, &deps)?;

        let tasks = durations
            .into_iter()
            .map(|(id, duration)| {
                let dependencies = deps.remove(&id).unwrap_or_default();
                let task = Task {
                    id: id.clone(),
                    duration,
                    dependencies,
                };
                (id, task)
            })
            .collect();

        Self::from_task_map(tasks, worker_count)
    }

    /// Build a plan from already-constructed tasks.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>, worker_count: usize) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for task in tasks {
            if by_id.contains_key(&task.id) {
                return Err(duplicate_task(&task.id));
            }
            by_id.insert(task.id.clone(), task);
        }
        Self::from_task_map(by_id, worker_count)
    }

    fn from_task_map(tasks: BTreeMap<TaskId, Task>, worker_count: usize) -> Result<Self> {
        super::validate::validate_plan(&tasks, worker_count)?;
        Ok(Self {
            tasks,
            worker_count,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Replace the worker count, re-checking it.
    pub fn with_worker_count(mut self, worker_count: usize) -> Result<Self> {
        super::validate::validate_worker_count(worker_count)?;
        self.worker_count = worker_count;
        Ok(self)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn duplicate_task(id: &str) -> BuildError {
    BuildError::ConfigError(format!("duplicate task id '{id}'"))
}

/// A manifest that passed validation.
#[derive(Debug, Clone)]
pub struct BuildManifest {
    pub settings: SettingsSection,
    plan: BuildPlan,
}

impl BuildManifest {
    pub(crate) fn new_unchecked(settings: SettingsSection, plan: BuildPlan) -> Self {
        Self { settings, plan }
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            drain_timeout: Duration::from_millis(self.settings.drain_timeout_ms),
        }
    }

    pub fn executor(&self) -> SimulatedExecutor {
        SimulatedExecutor::new(Duration::from_millis(self.settings.time_unit_ms))
    }
}
