use crate::runtime::task::Task;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A per-worker local task queue.
///
/// The owning worker pushes and pops at the back (LIFO), which keeps
/// recently spawned work hot in cache. Other workers steal from the
/// front (FIFO).
pub(crate) struct LocalQueue {
    inner: Mutex<VecDeque<Task>>,
}

impl LocalQueue {
    /// Creates an empty local task queue.
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, task: Task) {
        self.lock().push_back(task);
    }

    pub(crate) fn pop(&self) -> Option<Task> {
        self.lock().pop_back()
    }

    pub(crate) fn steal(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    /// Removes every queued task.
    pub(crate) fn drain(&self) -> VecDeque<Task> {
        std::mem::take(&mut *self.lock())
    }
}
