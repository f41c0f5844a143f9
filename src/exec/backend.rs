// src/exec/backend.rs

//! Pluggable task executor abstraction.
//!
//! Workers never know what "building" a task means: they hand each
//! [`ReadyItem`] to a [`TaskExecutor`] and report whatever it returns.
//!
//! - [`SimulatedExecutor`] is the default. It pretends to build a task,
//!   optionally sleeping `duration * time_unit` so concurrency is observable.
//! - Tests (and real integrations) provide their own implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::trace;

use crate::dag::ReadyItem;
use crate::engine::TaskOutcome;

/// Trait abstracting how a dispatched task is executed.
///
/// One executor instance is shared by every worker in the pool, so
/// implementations must be safe to call concurrently.
pub trait TaskExecutor: Send + Sync {
    fn execute<'a>(
        &'a self,
        item: &'a ReadyItem,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>>;
}

/// Stand-in for real work.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedExecutor {
    time_unit: Duration,
}

impl SimulatedExecutor {
    /// `time_unit` is the wall-clock length of one duration unit; zero makes
    /// every task complete immediately.
    pub fn new(time_unit: Duration) -> Self {
        Self { time_unit }
    }

    pub fn instant() -> Self {
        Self::default()
    }

    fn simulated_time(&self, duration: u64) -> Duration {
        let units = u32::try_from(duration).unwrap_or(u32::MAX);
        self.time_unit.saturating_mul(units)
    }
}

impl TaskExecutor for SimulatedExecutor {
    fn execute<'a>(
        &'a self,
        item: &'a ReadyItem,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>> {
        let wait = self.simulated_time(item.duration);

        Box::pin(async move {
            trace!(task = %item, ?wait, "simulating build");
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            TaskOutcome::Success
        })
    }
}
