// src/engine/result.rs

use std::fmt;

use crate::dag::ReadyItem;

/// Audit log of the order in which tasks became dispatchable.
///
/// Written only by the orchestrator. Entries are grouped into batches: every
/// task of one batch precedes every task of the next, and each batch is in
/// ascending (duration, id) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    build_order: Vec<ReadyItem>,
    /// Exclusive end index of each batch in `build_order`.
    batch_ends: Vec<usize>,
}

impl BuildResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_batch(&mut self, batch: &[ReadyItem]) {
        if batch.is_empty() {
            return;
        }
        self.build_order.extend_from_slice(batch);
        self.batch_ends.push(self.build_order.len());
    }

    /// Every dispatched task, in dispatch order.
    pub fn build_order(&self) -> &[ReadyItem] {
        &self.build_order
    }

    pub fn batches(&self) -> impl Iterator<Item = &[ReadyItem]> + '_ {
        let starts = std::iter::once(0).chain(self.batch_ends.iter().copied());
        starts
            .zip(self.batch_ends.iter().copied())
            .map(|(start, end)| &self.build_order[start..end])
    }

    pub fn batch_count(&self) -> usize {
        self.batch_ends.len()
    }

    pub fn task_ids(&self) -> Vec<&str> {
        self.build_order.iter().map(|i| i.task.as_str()).collect()
    }

    pub fn position_of(&self, task: &str) -> Option<usize> {
        self.build_order.iter().position(|i| i.task == task)
    }

    /// Index of the batch `task` was dispatched in.
    pub fn batch_of(&self, task: &str) -> Option<usize> {
        let pos = self.position_of(task)?;
        self.batch_ends.iter().position(|&end| pos < end)
    }

    pub fn len(&self) -> usize {
        self.build_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.build_order.is_empty()
    }
}

/// Renders as `[D:5, C:8, B:10, A:5]`.
impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.build_order.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "]")
    }
}
