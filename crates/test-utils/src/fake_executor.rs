use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dagbuild::dag::ReadyItem;
use dagbuild::engine::TaskOutcome;
use dagbuild::exec::TaskExecutor;

/// A fake executor that:
/// - records which tasks were started, in order
/// - optionally sleeps `duration * time_unit` per task
/// - tracks how many tasks ran at the same time
#[derive(Default)]
pub struct RecordingExecutor {
    time_unit: Duration,
    started: Mutex<Vec<String>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_time_unit(time_unit: Duration) -> Arc<Self> {
        Arc::new(Self {
            time_unit,
            ..Self::default()
        })
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    /// Highest number of tasks observed executing at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

impl TaskExecutor for RecordingExecutor {
    fn execute<'a>(
        &'a self,
        item: &'a ReadyItem,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>> {
        Box::pin(async move {
            self.started.lock().unwrap().push(item.task.clone());
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);

            let units = u32::try_from(item.duration).unwrap_or(u32::MAX);
            let wait = self.time_unit.saturating_mul(units);
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }

            self.running.fetch_sub(1, Ordering::SeqCst);
            TaskOutcome::Success
        })
    }
}

/// Succeeds for every task except the ones listed.
pub struct FailingExecutor {
    failing: HashSet<String>,
}

impl FailingExecutor {
    pub fn new(failing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl TaskExecutor for FailingExecutor {
    fn execute<'a>(
        &'a self,
        item: &'a ReadyItem,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>> {
        Box::pin(async move {
            if self.failing.contains(&item.task) {
                TaskOutcome::Failed(format!("{} exited with status 1", item.task))
            } else {
                TaskOutcome::Success
            }
        })
    }
}

/// Panics inside the executor for the listed tasks; every other task
/// succeeds immediately.
pub struct PanickingExecutor {
    panicking: HashSet<String>,
}

impl PanickingExecutor {
    pub fn new(panicking: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            panicking: panicking.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl TaskExecutor for PanickingExecutor {
    fn execute<'a>(
        &'a self,
        item: &'a ReadyItem,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>> {
        Box::pin(async move {
            if self.panicking.contains(&item.task) {
                panic!("executor exploded on {}", item.task);
            }
            TaskOutcome::Success
        })
    }
}

/// Never finishes the listed tasks; every other task succeeds immediately.
///
/// Used to exercise cancellation and drain timeouts.
pub struct StallingExecutor {
    stalling: HashSet<String>,
    stalled: AtomicUsize,
}

impl StallingExecutor {
    pub fn new(stalling: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            stalling: stalling.iter().map(|s| s.to_string()).collect(),
            stalled: AtomicUsize::new(0),
        })
    }

    /// Number of tasks currently stuck inside the executor.
    pub fn stalled(&self) -> usize {
        self.stalled.load(Ordering::SeqCst)
    }
}

impl TaskExecutor for StallingExecutor {
    fn execute<'a>(
        &'a self,
        item: &'a ReadyItem,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>> {
        Box::pin(async move {
            if self.stalling.contains(&item.task) {
                self.stalled.fetch_add(1, Ordering::SeqCst);
                std::future::pending::<()>().await;
            }
            TaskOutcome::Success
        })
    }
}
