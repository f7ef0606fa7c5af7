use super::hooks::{ThreadHooks, join_all};
use super::worker::Worker;
use super::Executor;
use crate::error::Error;
use crate::runtime::context::current_worker;
use crate::runtime::task::Task;
use crate::runtime::work_stealing::injector::Injector;
use crate::runtime::work_stealing::queue::LocalQueue;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

/// State shared between the pool handle and its workers.
pub(crate) struct Pool {
    pub(crate) injector: Injector,
    pub(crate) locals: Box<[LocalQueue]>,
    pub(crate) shutdown: AtomicBool,
}

impl Pool {
    /// Identity used to recognize this pool's workers.
    pub(crate) fn id(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }
}

/// A fixed-size pool of worker threads with work stealing.
///
/// Tasks enqueued from outside the pool go through a global injector.
/// Tasks enqueued from one of the pool's own workers go to that worker's
/// local queue; idle workers steal from their siblings.
///
/// Shutdown stops the workers, waits for them, and drops every task still
/// queued, which interrupts the computations waiting on them.
pub struct ThreadPoolExecutor {
    name: String,
    pool: Arc<Pool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPoolExecutor {
    pub const NAME: &'static str = "thread_pool_executor";

    /// Starts a pool of `threads` workers.
    ///
    /// # Panics
    ///
    /// Panics if `threads == 0` or if a worker thread cannot be spawned.
    pub fn new(name: impl Into<String>, threads: usize, hooks: ThreadHooks) -> Self {
        assert!(threads > 0, "a thread pool needs at least one worker");

        let name = name.into();
        let pool = Arc::new(Pool {
            injector: Injector::new(),
            locals: (0..threads).map(|_| LocalQueue::new()).collect(),
            shutdown: AtomicBool::new(false),
        });

        let handles = (0..threads)
            .map(|id| {
                let worker = Worker::new(id, pool.clone());
                hooks
                    .spawn(&name, move || worker.run())
                    .unwrap_or_else(|error| panic!("{error}"))
            })
            .collect();

        tracing::debug!(executor = %name, threads, "thread pool started");

        Self {
            name,
            pool,
            handles: Mutex::new(handles),
        }
    }

    /// Starts a pool named [`NAME`](Self::NAME) with one worker per
    /// available CPU.
    pub fn with_default_size() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self::new(Self::NAME, threads, ThreadHooks::default())
    }

    /// Empties every worker's local queue.
    fn drain_locals(&self) -> Vec<Task> {
        self.pool
            .locals
            .iter()
            .flat_map(|local| local.drain())
            .collect()
    }
}

impl Executor for ThreadPoolExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn enqueue(&self, task: Task) -> Result<(), Error> {
        if self.shutdown_requested() {
            return Err(Error::shutdown(&self.name, "enqueue"));
        }

        if let Some(index) = current_worker(self.pool.id()) {
            let local = &self.pool.locals[index];
            local.push(task);
            self.pool.injector.notify();

            // Lost a race with shutdown after the check: discard.
            if self.shutdown_requested() {
                drop(local.drain());
            }

            return Ok(());
        }

        self.pool
            .injector
            .push(task)
            .map_err(|_| Error::shutdown(&self.name, "enqueue"))
    }

    fn enqueue_batch(&self, tasks: Vec<Task>) -> Result<(), Error> {
        if self.shutdown_requested() {
            return Err(Error::shutdown(&self.name, "enqueue_batch"));
        }

        self.pool
            .injector
            .push_batch(tasks)
            .map_err(|_| Error::shutdown(&self.name, "enqueue_batch"))
    }

    fn max_concurrency_level(&self) -> usize {
        self.pool.locals.len()
    }

    fn shutdown_requested(&self) -> bool {
        self.pool.shutdown.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        if self.pool.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        // Queued tasks are dropped before joining: a worker may be blocked
        // on the outcome of one of them.
        let mut dropped = Vec::from(self.pool.injector.shutdown());
        dropped.extend(self.drain_locals());
        let count = dropped.len();
        drop(dropped);

        let handles = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );
        join_all(handles);

        // Pushed by workers that had not yet observed the shutdown flag.
        let late = self.drain_locals();
        let count = count + late.len();
        drop(late);

        tracing::debug!(executor = %self.name, dropped = count, "shut down");
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
