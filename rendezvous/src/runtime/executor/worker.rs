use super::thread_pool::Pool;
use crate::runtime::context::enter_worker;
use crate::runtime::task::Task;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Upper bound on how long an idle worker sleeps before looking for
/// work in its siblings' local queues again.
const PARK_TIMEOUT: Duration = Duration::from_millis(10);

/// A worker thread of a [`ThreadPoolExecutor`](super::ThreadPoolExecutor).
///
/// The execution order is:
/// 1. Pop from the local queue
/// 2. Steal from the global injector
/// 3. Steal from other workers
/// 4. Park if no work is available
pub(crate) struct Worker {
    /// Index of the worker, and of its local queue.
    id: usize,

    pool: Arc<Pool>,
}

impl Worker {
    pub(crate) fn new(id: usize, pool: Arc<Pool>) -> Self {
        Self { id, pool }
    }

    /// Runs the worker loop until the pool shuts down.
    pub(crate) fn run(&self) {
        enter_worker(self.pool.id(), self.id, || {
            while !self.pool.shutdown.load(Ordering::Acquire) {
                match self.next_task() {
                    Some(task) => task.run(),
                    None => self.pool.injector.park(PARK_TIMEOUT),
                }
            }
        });
    }

    fn next_task(&self) -> Option<Task> {
        self.pool.locals[self.id]
            .pop()
            .or_else(|| self.pool.injector.steal())
            .or_else(|| self.try_steal())
    }

    /// Attempts to steal a task from another worker's local queue.
    ///
    /// Workers are visited round-robin starting after this one.
    fn try_steal(&self) -> Option<Task> {
        let len = self.pool.locals.len();

        for i in 1..len {
            let victim = (self.id + i) % len;

            if let Some(task) = self.pool.locals[victim].steal() {
                tracing::trace!(worker = self.id, victim, "stole task");
                return Some(task);
            }
        }

        None
    }
}
