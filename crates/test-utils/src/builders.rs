#![allow(dead_code)]

use std::collections::BTreeMap;

use dagbuild::config::{BuildManifest, BuildPlan, RawManifest, SettingsSection, TaskSection};
use dagbuild::dag::Task;

/// Builder for `BuildPlan` to simplify test setup.
pub struct BuildPlanBuilder {
    tasks: Vec<Task>,
    workers: usize,
}

impl BuildPlanBuilder {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            workers: 1,
        }
    }

    pub fn task(mut self, id: &str, duration: u64, after: &[&str]) -> Self {
        self.tasks.push(Task::new(id, duration, after.iter().copied()));
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn try_build(self) -> dagbuild::errors::Result<BuildPlan> {
        BuildPlan::from_tasks(self.tasks, self.workers)
    }

    pub fn build(self) -> BuildPlan {
        self.try_build().expect("Failed to build valid plan from builder")
    }
}

impl Default for BuildPlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawManifest` / `BuildManifest`.
pub struct ManifestBuilder {
    manifest: RawManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            manifest: RawManifest {
                settings: SettingsSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, id: &str, duration: u64, after: &[&str]) -> Self {
        self.manifest.task.insert(
            id.to_string(),
            TaskSection {
                duration,
                after: after.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.manifest.settings.workers = workers;
        self
    }

    pub fn with_drain_timeout_ms(mut self, ms: u64) -> Self {
        self.manifest.settings.drain_timeout_ms = ms;
        self
    }

    pub fn raw(self) -> RawManifest {
        self.manifest
    }

    pub fn build(self) -> BuildManifest {
        BuildManifest::try_from(self.manifest).expect("Failed to build valid manifest from builder")
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
