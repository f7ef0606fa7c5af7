use crate::runtime::task::Task;

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct Queue {
    tasks: VecDeque<Task>,
    shutdown: bool,
}

/// Global task queue shared by the workers of an executor.
///
/// Newly enqueued tasks land here before a worker picks them up. The
/// injector also coordinates parking: idle workers sleep on its
/// condition variable until work arrives or shutdown begins.
///
/// The shutdown flag lives under the same lock as the queue, so a task
/// is either accepted before shutdown (and later drained) or refused.
pub(crate) struct Injector {
    queue: Mutex<Queue>,
    condvar: Condvar,
}

impl Injector {
    /// Creates a new empty injector.
    pub(crate) fn new() -> Self {
        Injector {
            queue: Mutex::new(Queue {
                tasks: VecDeque::new(),
                shutdown: false,
            }),
            condvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a task to the back of the queue and wakes one parked worker.
    ///
    /// Hands the task back if shutdown has begun.
    pub(crate) fn push(&self, task: Task) -> Result<(), Task> {
        let mut queue = self.lock();
        if queue.shutdown {
            return Err(task);
        }

        queue.tasks.push_back(task);
        drop(queue);

        self.condvar.notify_one();
        Ok(())
    }

    /// Pushes every task, in order, and wakes all parked workers.
    pub(crate) fn push_batch(&self, tasks: Vec<Task>) -> Result<(), Vec<Task>> {
        let mut queue = self.lock();
        if queue.shutdown {
            return Err(tasks);
        }

        queue.tasks.extend(tasks);
        drop(queue);

        self.condvar.notify_all();
        Ok(())
    }

    /// Takes a task from the front of the queue.
    pub(crate) fn steal(&self) -> Option<Task> {
        self.lock().tasks.pop_front()
    }

    /// Blocks until a task is available and takes it.
    ///
    /// Returns `None` once shutdown has begun, even if tasks remain;
    /// those are returned by [`shutdown`](Self::shutdown).
    pub(crate) fn pop(&self) -> Option<Task> {
        let mut queue = self.lock();

        loop {
            if queue.shutdown {
                return None;
            }

            if let Some(task) = queue.tasks.pop_front() {
                return Some(task);
            }

            queue = self
                .condvar
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Parks the calling worker until work is pushed, shutdown begins or
    /// `timeout` elapses.
    ///
    /// The timeout bounds how long work sitting in other workers' local
    /// queues can go unnoticed.
    pub(crate) fn park(&self, timeout: Duration) {
        let queue = self.lock();
        if queue.shutdown || !queue.tasks.is_empty() {
            return;
        }

        let _ = self
            .condvar
            .wait_timeout(queue, timeout)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Wakes one parked worker without pushing anything.
    pub(crate) fn notify(&self) {
        self.condvar.notify_one();
    }

    /// Refuses further pushes, wakes every worker and returns the tasks
    /// that were still queued.
    ///
    /// The caller drops them outside of any lock.
    pub(crate) fn shutdown(&self) -> VecDeque<Task> {
        let mut queue = self.lock();
        queue.shutdown = true;
        let tasks = std::mem::take(&mut queue.tasks);
        drop(queue);

        self.condvar.notify_all();
        tasks
    }
}
