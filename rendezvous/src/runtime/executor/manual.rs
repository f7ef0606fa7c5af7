use super::{Executor, UNBOUNDED_CONCURRENCY};
use crate::error::Error;
use crate::runtime::task::Task;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Slack added to every deadline so that coarse clocks do not make a
/// timed operation return just before its work arrives.
const DEADLINE_SLACK: Duration = Duration::from_millis(1);

struct Queue {
    tasks: VecDeque<Task>,
    abort: bool,
}

/// An executor with no thread of its own.
///
/// Tasks accumulate in a FIFO queue until the owner runs them with one of
/// the `loop_*` methods, from whichever thread it chooses. The `wait_*`
/// methods block until enough tasks are queued.
///
/// After [`shutdown`](Executor::shutdown) every operation fails with
/// [`Error::RuntimeShutdown`], including callers blocked in a `wait_*`
/// method at that moment.
pub struct ManualExecutor {
    queue: Mutex<Queue>,
    condvar: Condvar,
    shutdown: AtomicBool,
}

impl ManualExecutor {
    pub const NAME: &'static str = "manual_executor";

    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Queue {
                tasks: VecDeque::new(),
                abort: false,
            }),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_running(&self, method: &'static str) -> Result<(), Error> {
        if self.shutdown_requested() {
            return Err(Error::shutdown(Self::NAME, method));
        }

        Ok(())
    }

    /// Waits once on the condition variable. Returns `None` once `deadline`
    /// has passed; no deadline waits for the next notification.
    fn park<'a>(
        &self,
        queue: MutexGuard<'a, Queue>,
        deadline: Option<Instant>,
    ) -> Option<MutexGuard<'a, Queue>> {
        let Some(deadline) = deadline else {
            return Some(
                self.condvar
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner),
            );
        };

        let now = Instant::now();
        if now >= deadline {
            return None;
        }

        let (queue, _) = self
            .condvar
            .wait_timeout(queue, deadline - now)
            .unwrap_or_else(PoisonError::into_inner);

        Some(queue)
    }

    /// Number of queued tasks.
    pub fn size(&self) -> usize {
        self.lock().tasks.len()
    }

    /// Returns `true` if no task is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    /// Drops every queued task and returns how many there were.
    ///
    /// The dropped tasks interrupt their computations.
    pub fn clear(&self) -> Result<usize, Error> {
        let mut queue = self.lock();
        if queue.abort {
            return Err(Error::shutdown(Self::NAME, "clear"));
        }

        let tasks = std::mem::take(&mut queue.tasks);
        drop(queue);

        Ok(tasks.len())
    }

    /// Runs the oldest queued task, if any. Returns whether one ran.
    pub fn loop_once(&self) -> Result<bool, Error> {
        Ok(self.run(1, None, false)? == 1)
    }

    /// Runs the oldest task, waiting up to `timeout` for one to arrive.
    pub fn loop_once_for(&self, timeout: Duration) -> Result<bool, Error> {
        Ok(self.run(1, deadline_after(timeout), true)? == 1)
    }

    /// Runs up to `max` queued tasks in FIFO order without waiting.
    ///
    /// Returns how many ran.
    pub fn loop_n(&self, max: usize) -> Result<usize, Error> {
        self.run(max, None, false)
    }

    /// Runs up to `max` tasks, waiting for more to arrive until `timeout`
    /// elapses. Returns how many ran.
    pub fn loop_for(&self, max: usize, timeout: Duration) -> Result<usize, Error> {
        self.run(max, deadline_after(timeout), true)
    }

    /// Blocks until at least one task is queued.
    pub fn wait_for_task(&self) -> Result<(), Error> {
        self.wait_for_tasks(1)
    }

    /// Blocks until at least one task is queued or `timeout` elapses.
    ///
    /// Returns `true` if a task is queued.
    pub fn wait_for_task_for(&self, timeout: Duration) -> Result<bool, Error> {
        Ok(self.wait_for_tasks_for(1, timeout)? >= 1)
    }

    /// Blocks until at least `count` tasks are queued.
    pub fn wait_for_tasks(&self, count: usize) -> Result<(), Error> {
        if count == 0 {
            return self.ensure_running("wait_for_tasks");
        }

        let queue = self
            .condvar
            .wait_while(self.lock(), |queue| {
                !queue.abort && queue.tasks.len() < count
            })
            .unwrap_or_else(PoisonError::into_inner);

        if queue.abort {
            return Err(Error::shutdown(Self::NAME, "wait_for_tasks"));
        }

        Ok(())
    }

    /// Blocks until at least `count` tasks are queued or `timeout`
    /// elapses. Returns the number of queued tasks.
    pub fn wait_for_tasks_for(&self, count: usize, timeout: Duration) -> Result<usize, Error> {
        if count == 0 {
            self.ensure_running("wait_for_tasks_for")?;
            return Ok(self.size());
        }

        let deadline = deadline_after(timeout);
        let mut queue = self.lock();

        loop {
            if queue.abort {
                return Err(Error::shutdown(Self::NAME, "wait_for_tasks_for"));
            }

            if queue.tasks.len() >= count {
                return Ok(queue.tasks.len());
            }

            queue = match self.park(queue, deadline) {
                Some(queue) => queue,
                None => return Ok(self.size()),
            };
        }
    }

    /// Pops and runs up to `max` tasks outside the lock.
    ///
    /// With `wait`, an empty queue is waited on until `deadline` (or
    /// forever without one); otherwise the loop stops at the first empty
    /// queue. A zero `max` returns at once, even after shutdown.
    fn run(&self, max: usize, deadline: Option<Instant>, wait: bool) -> Result<usize, Error> {
        if max == 0 {
            return Ok(0);
        }

        let mut executed = 0;

        'tasks: while executed < max {
            let mut queue = self.lock();

            let task = loop {
                if queue.abort {
                    break 'tasks;
                }

                if let Some(task) = queue.tasks.pop_front() {
                    break task;
                }

                if !wait {
                    break 'tasks;
                }

                queue = match self.park(queue, deadline) {
                    Some(queue) => queue,
                    None => break 'tasks,
                };
            };

            drop(queue);

            task.run();
            executed += 1;
        }

        self.ensure_running("loop")?;
        Ok(executed)
    }
}

/// `None` stands for "no deadline" when `timeout` overflows `Instant`.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout.saturating_add(DEADLINE_SLACK))
}

impl Default for ManualExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ManualExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn enqueue(&self, task: Task) -> Result<(), Error> {
        let mut queue = self.lock();
        if queue.abort {
            drop(queue);
            return Err(Error::shutdown(Self::NAME, "enqueue"));
        }

        queue.tasks.push_back(task);
        drop(queue);

        self.condvar.notify_all();
        Ok(())
    }

    fn enqueue_batch(&self, tasks: Vec<Task>) -> Result<(), Error> {
        let mut queue = self.lock();
        if queue.abort {
            drop(queue);
            return Err(Error::shutdown(Self::NAME, "enqueue_batch"));
        }

        queue.tasks.extend(tasks);
        drop(queue);

        self.condvar.notify_all();
        Ok(())
    }

    fn max_concurrency_level(&self) -> usize {
        UNBOUNDED_CONCURRENCY
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut queue = self.lock();
        queue.abort = true;
        let tasks = std::mem::take(&mut queue.tasks);
        drop(queue);

        self.condvar.notify_all();

        tracing::debug!(executor = Self::NAME, dropped = tasks.len(), "shut down");
        drop(tasks);
    }
}
