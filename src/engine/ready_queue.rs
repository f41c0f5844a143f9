// src/engine/ready_queue.rs

//! Duration-ordered hand-off from the orchestrator to the workers.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::Semaphore;
use tracing::trace;

use crate::dag::ReadyItem;
use crate::errors::{BuildError, Result};

/// What a worker receives from [`ReadyQueue::take`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Task(ReadyItem),
    /// Exit the consume loop. One is sent per worker at drain time.
    Stop,
}

#[derive(Debug, Default)]
struct QueueState {
    /// Min-heap on (duration, id).
    items: BinaryHeap<Reverse<ReadyItem>>,
    /// Stop signals not yet handed out. Kept out of the heap so they never
    /// take part in ordering.
    stops: usize,
}

/// Blocking priority queue shared by the orchestrator (producer) and all
/// workers (consumers).
///
/// The semaphore holds one permit per queued entry, so a successful
/// `acquire` guarantees there is something to pop.
#[derive(Debug)]
pub struct ReadyQueue {
    state: Mutex<QueueState>,
    available: Semaphore,
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            available: Semaphore::new(0),
        }
    }

    pub fn push(&self, item: ReadyItem) {
        trace!(task = %item, "ready queue: push");
        self.lock().items.push(Reverse(item));
        self.available.add_permits(1);
    }

    /// Queue `count` stop signals, one per worker that should exit.
    pub fn push_stop(&self, count: usize) {
        trace!(count, "ready queue: push stop signals");
        self.lock().stops += count;
        self.available.add_permits(count);
    }

    /// Wait for the next entry.
    ///
    /// Queued tasks are always handed out before stop signals. Fails with
    /// [`BuildError::InterruptedExecution`] once the queue is closed.
    pub async fn take(&self) -> Result<Dispatch> {
        let permit = self.available.acquire().await.map_err(|_| {
            BuildError::InterruptedExecution("ready queue closed".to_string())
        })?;
        permit.forget();

        let mut state = self.lock();
        if let Some(Reverse(item)) = state.items.pop() {
            return Ok(Dispatch::Task(item));
        }
        if state.stops > 0 {
            state.stops -= 1;
            return Ok(Dispatch::Stop);
        }

        Err(BuildError::InterruptedExecution(
            "ready queue signalled with nothing queued".to_string(),
        ))
    }

    /// Wake every waiting consumer with an error; later `take` calls fail too.
    pub fn close(&self) {
        self.available.close();
    }

    pub fn is_closed(&self) -> bool {
        self.available.is_closed()
    }

    /// Number of queued task items (stop signals excluded).
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
