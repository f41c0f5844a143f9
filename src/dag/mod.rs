// src/dag/mod.rs

//! Task model and dependency tracking.
//!
//! - [`task`] holds the immutable task description and the dispatchable
//!   [`ReadyItem`].
//! - [`graph`] holds the orchestrator-owned [`DependencyGraph`] that answers
//!   "what is ready now?" and absorbs completions.

pub mod graph;
pub mod task;

pub use graph::DependencyGraph;
pub use task::{ReadyItem, Task, TaskId};
