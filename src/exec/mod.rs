// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`backend`] provides the [`TaskExecutor`] trait and the default
//!   [`SimulatedExecutor`]; tests swap in their own implementation.
//! - [`pool`] owns the fixed-size [`WorkerPool`] and the per-worker consume
//!   loop that feeds the completion queue.

pub mod backend;
pub mod pool;

pub use backend::{SimulatedExecutor, TaskExecutor};
pub use pool::WorkerPool;
