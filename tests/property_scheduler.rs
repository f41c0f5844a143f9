mod common;
use crate::common::assert_valid_build;

use std::collections::BTreeSet;

use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

use dagbuild::config::BuildPlan;
use dagbuild::dag::Task;
use dagbuild::engine::{BuildOptions, BuildResult};
use dagbuild::errors::BuildError;
use dagbuild::exec::SimulatedExecutor;

// Acyclic by construction: task N may only depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Task>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let deps_strat = proptest::collection::vec(
            (0..20u64, proptest::collection::vec(any::<usize>(), 0..num_tasks)),
            num_tasks,
        );

        deps_strat.prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (duration, potential_deps))| {
                    let deps: BTreeSet<String> = potential_deps
                        .into_iter()
                        .filter(|_| i > 0)
                        .map(|d| format!("task_{:02}", d % i))
                        .collect();
                    Task::new(format!("task_{:02}", i), duration, deps)
                })
                .collect()
        })
    })
}

fn run(plan: &BuildPlan) -> Result<BuildResult, BuildError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(dagbuild::build_with(
        plan,
        std::sync::Arc::new(SimulatedExecutor::instant()),
        BuildOptions::default(),
        CancellationToken::new(),
    ))
}

proptest! {
    #[test]
    fn every_acyclic_plan_builds_in_dependency_order(
        tasks in dag_strategy(12),
        workers in 1..6usize,
    ) {
        let plan = BuildPlan::from_tasks(tasks, workers).unwrap();
        let result = run(&plan).unwrap();

        assert_valid_build(&plan, &result);
    }

    #[test]
    fn repeated_runs_dispatch_the_same_tasks(
        tasks in dag_strategy(10),
        workers in 1..4usize,
    ) {
        let plan = BuildPlan::from_tasks(tasks, workers).unwrap();
        let first = run(&plan).unwrap();
        let second = run(&plan).unwrap();

        assert_valid_build(&plan, &second);
        let mut a = first.task_ids();
        let mut b = second.task_ids();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn back_edge_is_always_reported_as_cycle(
        tasks in dag_strategy(8),
    ) {
        // First and last now depend on each other.
        prop_assume!(tasks.len() >= 2);
        let last = tasks[tasks.len() - 1].id.clone();
        let first = tasks[0].id.clone();
        let mut tasks = tasks;
        let n = tasks.len();
        tasks[0].dependencies.insert(last.clone());
        tasks[n - 1].dependencies.insert(first.clone());

        match BuildPlan::from_tasks(tasks, 1) {
            Err(BuildError::CycleError { cycle }) => {
                prop_assert!(cycle.contains(&first));
                prop_assert!(cycle.contains(&last));
            }
            other => prop_assert!(false, "expected CycleError, got {:?}", other),
        }
    }
}
