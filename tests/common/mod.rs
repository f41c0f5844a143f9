#![allow(dead_code)]

pub use dagbuild_test_utils::builders;
pub use dagbuild_test_utils::{init_tracing, with_timeout};

use dagbuild::config::BuildPlan;
use dagbuild::engine::BuildResult;

/// Assert the invariants every successful build must satisfy:
/// - every task of the plan appears exactly once
/// - every task is dispatched in a later batch than each of its dependencies
/// - each batch is ascending by (duration, id)
pub fn assert_valid_build(plan: &BuildPlan, result: &BuildResult) {
    assert_eq!(result.len(), plan.len(), "every task dispatched exactly once: {result}");

    for task in plan.tasks() {
        let batch = result
            .batch_of(&task.id)
            .unwrap_or_else(|| panic!("task {} missing from {result}", task.id));
        for dep in task.dependencies.iter() {
            let dep_batch = result.batch_of(dep).expect("dependency dispatched");
            assert!(
                dep_batch < batch,
                "{} (batch {batch}) dispatched before its dependency {dep} (batch {dep_batch})",
                task.id
            );
        }
    }

    for batch in result.batches() {
        assert!(
            batch.windows(2).all(|w| w[0] < w[1]),
            "batch not in (duration, id) order: {batch:?}"
        );
    }
}
