// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{BuildManifest, BuildPlan, load_and_validate};
use crate::dag::TaskId;
use crate::engine::{BuildOptions, BuildResult, Orchestrator};
use crate::errors::Result;
use crate::exec::{SimulatedExecutor, TaskExecutor};

/// Simulate a build of `durations` / `dependencies` on `worker_count`
/// workers and return the order in which tasks were dispatched.
///
/// Input is validated before anything runs: unknown dependencies, a zero
/// worker count and dependency cycles are rejected up front.
pub async fn build<K, D, V>(
    durations: impl IntoIterator<Item = (K, u64)>,
    dependencies: impl IntoIterator<Item = (K, D)>,
    worker_count: usize,
) -> Result<BuildResult>
where
    K: Into<TaskId>,
    D: IntoIterator<Item = V>,
    V: Into<TaskId>,
{
    let plan = BuildPlan::new(durations, dependencies, worker_count)?;
    build_with(
        &plan,
        Arc::new(SimulatedExecutor::instant()),
        BuildOptions::default(),
        CancellationToken::new(),
    )
    .await
}

/// Run a validated plan with a caller-provided executor.
///
/// Cancelling `cancel` aborts the build with
/// [`errors::BuildError::InterruptedExecution`].
pub async fn build_with(
    plan: &BuildPlan,
    executor: Arc<dyn TaskExecutor>,
    options: BuildOptions,
    cancel: CancellationToken,
) -> Result<BuildResult> {
    Orchestrator::new(plan, executor, options, cancel).run().await
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading and validation
/// - the simulated executor
/// - Ctrl-C handling
/// - result printing
pub async fn run(args: CliArgs) -> Result<()> {
    let manifest_path = PathBuf::from(&args.manifest);
    let manifest = load_and_validate(&manifest_path)?;

    let plan = match args.workers {
        Some(workers) => manifest.plan().clone().with_worker_count(workers)?,
        None => manifest.plan().clone(),
    };

    if args.dry_run {
        print_dry_run(&manifest, &plan);
        return Ok(());
    }

    let cancel = CancellationToken::new();

    // Ctrl-C → cancel the build.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    info!(manifest = %manifest_path.display(), "running build");
    let result = build_with(
        &plan,
        Arc::new(manifest.executor()),
        manifest.options(),
        cancel,
    )
    .await?;

    print_result(&result);
    Ok(())
}

fn print_result(result: &BuildResult) {
    println!("build order: {result}");
    for (i, batch) in result.batches().enumerate() {
        let items: Vec<String> = batch.iter().map(|item| item.to_string()).collect();
        println!("  batch {}: {}", i + 1, items.join(", "));
    }
}

/// Simple dry-run output: print settings and tasks with their prerequisites.
fn print_dry_run(manifest: &BuildManifest, plan: &BuildPlan) {
    println!("dagbuild dry-run");
    println!("  workers = {}", plan.worker_count());
    println!("  drain_timeout_ms = {}", manifest.settings.drain_timeout_ms);
    println!("  time_unit_ms = {}", manifest.settings.time_unit_ms);
    println!();

    println!("tasks ({}):", plan.len());
    for task in plan.tasks() {
        println!("  - {} (duration {})", task.id, task.duration);
        if !task.dependencies.is_empty() {
            let deps: Vec<&str> = task.dependencies.iter().map(String::as_str).collect();
            println!("      after: {:?}", deps);
        }
    }

    debug!("dry-run complete (nothing executed)");
}
